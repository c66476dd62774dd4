pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::jd_fetch::handlers as jd_fetch;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/analyze", post(analysis::handle_analyze))
        .route("/api/v1/extract-jd", post(jd_fetch::handle_extract_jd))
        .route("/api/v1/history", get(analysis::handle_history))
        .route("/api/v1/history/:id", get(analysis::handle_get_analysis))
        .with_state(state)
}
