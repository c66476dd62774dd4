use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use tracing::info;
use uuid::Uuid;

use crate::analysis::orchestrator::{run_analysis, AnalysisResult};
use crate::analysis::store::StoreError;
use crate::errors::AppError;
use crate::jd_fetch::extractor::validate_url;
use crate::state::AppState;

/// Trimmed JD text shorter than this never reaches the pipeline.
pub const MIN_JD_CHARS: usize = 20;

pub const DEFAULT_HISTORY_LIMIT: i64 = 20;
pub const MAX_HISTORY_LIMIT: i64 = 100;
const JD_PREVIEW_CHARS: usize = 160;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub jd_text: String,
    #[serde(default)]
    pub source_url: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub analysis_id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(flatten)]
    pub result: AnalysisResult,
}

/// POST /api/v1/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let jd_text = req.jd_text.trim();
    if jd_text.chars().count() < MIN_JD_CHARS {
        return Err(AppError::Validation(format!(
            "jdText is required and must be at least {MIN_JD_CHARS} characters."
        )));
    }

    let source_url = match req.source_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => Some(validate_url(url)?.to_string()),
        _ => None,
    };

    let result = run_analysis(jd_text, state.producer.as_ref(), &state.taxonomy).await?;
    let stored = state.store.insert(jd_text, &result).await?;
    info!("Analysis {} completed with score {}", stored.id, result.score);

    Ok(Json(AnalyzeResponse {
        analysis_id: stored.id,
        created_at: stored.created_at,
        source_url,
        result,
    }))
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<String>,
}

#[derive(Serialize)]
pub struct HistoryRecord {
    pub id: Uuid,
    pub jd_text: String,
    pub jd_preview: String,
    pub score: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct HistoryListResponse {
    pub records: Vec<HistoryRecord>,
}

/// GET /api/v1/history
pub async fn handle_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<HistoryListResponse>, AppError> {
    let limit = history_limit(params.limit.as_deref());
    let rows = state.store.list_recent(limit).await?;

    let records = rows
        .into_iter()
        .map(|row| HistoryRecord {
            jd_preview: row.jd_text.chars().take(JD_PREVIEW_CHARS).collect(),
            id: row.id,
            jd_text: row.jd_text,
            score: row.score,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(HistoryListResponse { records }))
}

#[derive(Serialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub jd_text: String,
    pub score: i32,
    pub created_at: DateTime<Utc>,
    /// Emitted verbatim from storage.
    pub result_json: Box<RawValue>,
}

#[derive(Serialize)]
pub struct AnalysisRecordResponse {
    pub record: AnalysisRecord,
}

/// GET /api/v1/history/:id
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AnalysisRecordResponse>, AppError> {
    let row = state.store.get(id).await?;
    let result_json = RawValue::from_string(row.result_json).map_err(StoreError::from)?;

    Ok(Json(AnalysisRecordResponse {
        record: AnalysisRecord {
            id: row.id,
            jd_text: row.jd_text,
            score: row.score,
            created_at: row.created_at,
            result_json,
        },
    }))
}

/// Unparseable or missing limits fall back to the default; others are clamped.
pub fn history_limit(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .map(|n| n.clamp(1, MAX_HISTORY_LIMIT))
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
}
