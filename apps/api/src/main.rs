mod analysis;
mod config;
mod db;
mod errors;
mod jd_fetch;
mod llm_client;
mod models;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::producer::LlmBundleProducer;
use crate::analysis::store::PgAnalysisStore;
use crate::analysis::taxonomy::Taxonomy;
use crate::config::Config;
use crate::db::create_pool;
use crate::jd_fetch::JdExtractor;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Skillmap API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize LLM client
    if config.llm.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; analysis requests will fail until it is");
    }
    let llm = LlmClient::new(config.llm.clone())?;
    info!("LLM client initialized (model: {})", llm.model());

    let taxonomy = Taxonomy::standard()?;
    info!(
        "Skill taxonomy loaded: {} skills across {} categories",
        taxonomy.skills().len(),
        taxonomy.categories().len()
    );

    // Build app state
    let state = AppState {
        store: Arc::new(PgAnalysisStore::new(db)),
        producer: Arc::new(LlmBundleProducer::new(llm)),
        taxonomy: Arc::new(taxonomy),
        extractor: JdExtractor::new(config.jd_fetch_timeout)?,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
