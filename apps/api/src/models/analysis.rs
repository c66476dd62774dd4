use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Full persisted analysis. `result_json` is the serialized `AnalysisResult`
/// exactly as it was written.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnalysisRow {
    pub id: Uuid,
    pub jd_text: String,
    pub score: i32,
    pub result_json: String,
    pub created_at: DateTime<Utc>,
}

/// Listing projection used by the history endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HistoryRow {
    pub id: Uuid,
    pub jd_text: String,
    pub score: i32,
    pub created_at: DateTime<Utc>,
}

impl From<&AnalysisRow> for HistoryRow {
    fn from(row: &AnalysisRow) -> Self {
        Self {
            id: row.id,
            jd_text: row.jd_text.clone(),
            score: row.score,
            created_at: row.created_at,
        }
    }
}
