use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::jd_fetch::ExtractedJd;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ExtractJdRequest {
    #[serde(default)]
    pub url: String,
}

/// POST /api/v1/extract-jd
pub async fn handle_extract_jd(
    State(state): State<AppState>,
    Json(req): Json<ExtractJdRequest>,
) -> Result<Json<ExtractedJd>, AppError> {
    let url = req.url.trim();
    if url.is_empty() {
        return Err(AppError::Validation("url is required.".to_string()));
    }

    Ok(Json(state.extractor.extract(url).await?))
}

#[cfg(test)]
mod tests {
    use crate::analysis::bundle::{AnalysisBundle, BundleError};
    use crate::analysis::producer::BundleProducer;
    use crate::analysis::taxonomy::Taxonomy;
    use crate::routes::build_router;
    use crate::state::AppState;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct NoopProducer;

    #[async_trait]
    impl BundleProducer for NoopProducer {
        async fn produce(&self, _jd: &str, _t: &Taxonomy) -> Result<AnalysisBundle, BundleError> {
            Ok(AnalysisBundle::default())
        }
    }

    async fn post_extract(body: Value) -> (StatusCode, Value) {
        let app = build_router(AppState::for_tests(Arc::new(NoopProducer)));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/extract-jd")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_blank_url_is_rejected() {
        let (status, body) = post_extract(json!({ "url": "   " })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "url is required.");
    }

    #[tokio::test]
    async fn test_non_http_scheme_is_client_error() {
        let (status, body) = post_extract(json!({ "url": "ftp://example.com/jd" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["detail"], "Only http/https URLs are supported.");
    }

    #[tokio::test]
    async fn test_malformed_url_is_client_error() {
        let (status, body) = post_extract(json!({ "url": "jobs at acme" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["detail"], "Invalid URL format.");
    }
}
