use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{IngestJob, IngestStatus};

/// `program_ingest_jobs` and `program_ingest_results`.
#[async_trait]
pub trait IngestJobStore: Send + Sync {
    async fn find_job(&self, job_id: Uuid) -> Result<Option<IngestJob>, sqlx::Error>;

    async fn set_status(&self, job_id: Uuid, status: IngestStatus, error: Option<&str>) -> Result<(), sqlx::Error>;

    async fn save_raw_text(&self, job_id: Uuid, raw_text: &str) -> Result<(), sqlx::Error>;

    async fn insert_result(&self, job_id: Uuid, parsed: &Value, model_hint: &str) -> Result<(), sqlx::Error>;
}

#[derive(Clone)]
pub struct PgIngestJobStore {
    db: PgPool,
}

impl PgIngestJobStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IngestJobStore for PgIngestJobStore {
    async fn find_job(&self, job_id: Uuid) -> Result<Option<IngestJob>, sqlx::Error> {
        sqlx::query_as::<_, IngestJob>(
            "SELECT id, source, storage_path, raw_text, status FROM program_ingest_jobs WHERE id = $1",
        )
        .bind(job_id)
        .fetch_optional(&self.db)
        .await
    }

    async fn set_status(&self, job_id: Uuid, status: IngestStatus, error: Option<&str>) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE program_ingest_jobs SET status = $2, error = $3, updated_at = $4 WHERE id = $1")
            .bind(job_id)
            .bind(status.as_str())
            .bind(error)
            .bind(Utc::now())
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn save_raw_text(&self, job_id: Uuid, raw_text: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE program_ingest_jobs SET raw_text = $2, updated_at = $3 WHERE id = $1")
            .bind(job_id)
            .bind(raw_text)
            .bind(Utc::now())
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn insert_result(&self, job_id: Uuid, parsed: &Value, model_hint: &str) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO program_ingest_results (job_id, parsed_json, model_hint) VALUES ($1, $2, $3)")
            .bind(job_id)
            .bind(parsed)
            .bind(model_hint)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
