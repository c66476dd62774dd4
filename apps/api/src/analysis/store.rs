//! Persistence port for completed analyses.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::analysis::orchestrator::AnalysisResult;
use crate::models::analysis::{AnalysisRow, HistoryRow};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Analysis {0} not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stored result could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Metadata assigned by the store on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredAnalysis {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn insert(&self, jd_text: &str, result: &AnalysisResult) -> Result<StoredAnalysis, StoreError>;

    async fn get(&self, id: Uuid) -> Result<AnalysisRow, StoreError>;

    /// Newest first. `limit` is expected to be already clamped by the caller.
    async fn list_recent(&self, limit: i64) -> Result<Vec<HistoryRow>, StoreError>;
}

pub struct PgAnalysisStore {
    pool: PgPool,
}

impl PgAnalysisStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalysisStore for PgAnalysisStore {
    async fn insert(&self, jd_text: &str, result: &AnalysisResult) -> Result<StoredAnalysis, StoreError> {
        let id = Uuid::new_v4();
        let result_json = serde_json::to_string(result)?;

        let created_at: DateTime<Utc> = sqlx::query_scalar(
            r#"
            INSERT INTO analyses (id, jd_text, score, result_json)
            VALUES ($1, $2, $3, $4)
            RETURNING created_at
            "#,
        )
        .bind(id)
        .bind(jd_text)
        .bind(i32::from(result.score))
        .bind(&result_json)
        .fetch_one(&self.pool)
        .await?;

        info!("Stored analysis {id} (score {})", result.score);
        Ok(StoredAnalysis { id, created_at })
    }

    async fn get(&self, id: Uuid) -> Result<AnalysisRow, StoreError> {
        sqlx::query_as::<_, AnalysisRow>(
            "SELECT id, jd_text, score, result_json, created_at FROM analyses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound(id))
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<HistoryRow>, StoreError> {
        Ok(sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT id, jd_text, score, created_at
            FROM analyses
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }
}

/// In-process store used by handler tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryAnalysisStore {
    rows: std::sync::Mutex<Vec<AnalysisRow>>,
}

#[cfg(test)]
#[async_trait]
impl AnalysisStore for MemoryAnalysisStore {
    async fn insert(&self, jd_text: &str, result: &AnalysisResult) -> Result<StoredAnalysis, StoreError> {
        let stored = StoredAnalysis {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(AnalysisRow {
            id: stored.id,
            jd_text: jd_text.to_string(),
            score: i32::from(result.score),
            result_json: serde_json::to_string(result)?,
            created_at: stored.created_at,
        });
        Ok(stored)
    }

    async fn get(&self, id: Uuid) -> Result<AnalysisRow, StoreError> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<HistoryRow>, StoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .rev()
            .take(usize::try_from(limit).unwrap_or(0))
            .map(HistoryRow::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::orchestrator::run_stages;
    use crate::analysis::bundle::AnalysisBundle;
    use crate::analysis::taxonomy::Taxonomy;

    fn sample_result() -> AnalysisResult {
        run_stages(
            "Platform engineer for cloud infrastructure",
            &AnalysisBundle::default(),
            &Taxonomy::standard().unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_round_trip_result_json_is_byte_identical() {
        let store = MemoryAnalysisStore::default();
        let result = sample_result();
        let stored = store.insert("Platform engineer", &result).await.unwrap();

        let row = store.get(stored.id).await.unwrap();
        assert_eq!(row.result_json, serde_json::to_string(&result).unwrap());
        assert_eq!(row.score, i32::from(result.score));

        let decoded: AnalysisResult = serde_json::from_str(&row.result_json).unwrap();
        assert_eq!(decoded, result);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let store = MemoryAnalysisStore::default();
        let id = Uuid::new_v4();
        let err = store.get(id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn test_list_recent_is_newest_first_and_limited() {
        let store = MemoryAnalysisStore::default();
        let result = sample_result();
        for jd in ["first", "second", "third"] {
            store.insert(jd, &result).await.unwrap();
        }

        let rows = store.list_recent(2).await.unwrap();
        let texts: Vec<&str> = rows.iter().map(|r| r.jd_text.as_str()).collect();
        assert_eq!(texts, vec!["third", "second"]);
    }
}
