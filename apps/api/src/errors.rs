use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::analysis::stages::StageError;
use crate::analysis::store::StoreError;
use crate::jd_fetch::ExtractError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Skill orchestration failed: {0}")]
    Pipeline(#[from] StageError),

    #[error("JD extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Persistence error: {0}")]
    Persistence(StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::NotFound(format!("Analysis {id} not found")),
            other => AppError::Persistence(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, detail) = match &self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::Pipeline(e) => {
                tracing::error!("Pipeline error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "PIPELINE_ERROR",
                    "Skill orchestration failed.".to_string(),
                    Some(e.to_string()),
                )
            }
            AppError::Extraction(e) if e.is_client_error() => (
                StatusCode::BAD_REQUEST,
                "EXTRACTION_ERROR",
                "JD extraction failed.".to_string(),
                Some(e.to_string()),
            ),
            AppError::Extraction(e) => {
                tracing::error!("JD extraction error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "EXTRACTION_ERROR",
                    "JD extraction failed.".to_string(),
                    Some(e.to_string()),
                )
            }
            AppError::Persistence(e) => {
                tracing::error!("Persistence error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                    Some(e.to_string()),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(detail) = detail {
            error["detail"] = Value::String(detail);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::stages::StageFailure;
    use axum::body::to_bytes;
    use uuid::Uuid;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_is_400_without_detail() {
        let response = AppError::Validation("too short".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"].get("detail").is_none());
    }

    #[tokio::test]
    async fn test_pipeline_is_502_with_tagged_detail() {
        let err = StageError::new(
            "Bullet Generation Skill",
            StageFailure::SanitizationExhausted {
                produced: 0,
                required: 3,
            },
        );
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert!(body["error"]["detail"]
            .as_str()
            .unwrap()
            .starts_with("[Bullet Generation Skill] "));
    }

    #[test]
    fn test_extraction_status_depends_on_cause() {
        let client = AppError::from(ExtractError::TooShort { length: 10 }).into_response();
        assert_eq!(client.status(), StatusCode::BAD_REQUEST);

        let server = AppError::from(ExtractError::Status(500)).into_response();
        assert_eq!(server.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_store_not_found_maps_to_404() {
        let response = AppError::from(StoreError::NotFound(Uuid::new_v4())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
