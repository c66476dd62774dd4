//! Generative bundle producer.
//!
//! One structured request per analysis. The raw response is sanitized into an
//! [`AnalysisBundle`] before any stage sees it.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use crate::analysis::bundle::{sanitize_bundle, AnalysisBundle, BundleError};
use crate::analysis::prompts::{BUNDLE_CONSTRAINTS, BUNDLE_ROLE_SYSTEM};
use crate::analysis::taxonomy::Taxonomy;
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, TAXONOMY_ONLY_INSTRUCTION};
use crate::llm_client::{ChatMessage, LlmClient};

/// Source of analysis bundles. Swappable so the pipeline can run without a live model.
#[async_trait]
pub trait BundleProducer: Send + Sync {
    async fn produce(&self, jd_text: &str, taxonomy: &Taxonomy) -> Result<AnalysisBundle, BundleError>;
}

/// Default producer backed by the chat completion client.
pub struct LlmBundleProducer {
    llm: LlmClient,
}

impl LlmBundleProducer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl BundleProducer for LlmBundleProducer {
    async fn produce(&self, jd_text: &str, taxonomy: &Taxonomy) -> Result<AnalysisBundle, BundleError> {
        let messages = build_messages(jd_text, taxonomy)?;

        info!(
            "Requesting analysis bundle from {} ({} taxonomy skills)",
            self.llm.model(),
            taxonomy.skills().len()
        );
        let raw = self.llm.call_json(&messages).await?;

        sanitize_bundle(&raw, jd_text)
    }
}

/// System + user messages for the bundle request. The user message is a JSON
/// document carrying the JD, the full taxonomy, the output schema and constraints.
pub fn build_messages(jd_text: &str, taxonomy: &Taxonomy) -> Result<Vec<ChatMessage>, BundleError> {
    let system = format!("{BUNDLE_ROLE_SYSTEM} {TAXONOMY_ONLY_INSTRUCTION} {JSON_ONLY_SYSTEM}");

    let payload = json!({
        "jdText": jd_text,
        "taxonomy": taxonomy.skills(),
        "output_schema": output_schema(),
        "constraints": BUNDLE_CONSTRAINTS,
    });

    Ok(vec![
        ChatMessage::system(system),
        ChatMessage::user(serde_json::to_string(&payload)?),
    ])
}

fn output_schema() -> Value {
    json!({
        "normalizedText": "string",
        "tokens": ["string"],
        "matchedSkills": [{ "name": "string", "evidence": ["string"] }],
        "missingSkills": [{ "category": "string", "suggestions": ["string"] }],
        "summary": "string",
        "bullets": ["string"],
    })
}
