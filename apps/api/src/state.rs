use std::sync::Arc;

use crate::analysis::producer::BundleProducer;
use crate::analysis::store::AnalysisStore;
use crate::analysis::taxonomy::Taxonomy;
use crate::jd_fetch::JdExtractor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AnalysisStore>,
    /// Pluggable bundle source. Default: LlmBundleProducer.
    pub producer: Arc<dyn BundleProducer>,
    /// Read-only after startup.
    pub taxonomy: Arc<Taxonomy>,
    pub extractor: JdExtractor,
}

#[cfg(test)]
impl AppState {
    /// State over the in-memory store and the standard taxonomy.
    pub fn for_tests(producer: Arc<dyn BundleProducer>) -> Self {
        use crate::analysis::store::MemoryAnalysisStore;

        Self {
            store: Arc::new(MemoryAnalysisStore::default()),
            producer,
            taxonomy: Arc::new(Taxonomy::standard().unwrap()),
            extractor: JdExtractor::new(std::time::Duration::from_secs(1)).unwrap(),
        }
    }
}
