use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{IngestJob, IngestStatus};
use crate::services::{IngestJobStore, ObjectStorage, ProgramParser};

/// Drives one ingest job from `processing` to `succeeded` or `failed`.
#[derive(Clone)]
pub struct ProgramIngestService {
    jobs: Arc<dyn IngestJobStore>,
    storage: Arc<dyn ObjectStorage>,
    parser: Arc<dyn ProgramParser>,
    bucket: String,
}

impl ProgramIngestService {
    pub fn new(
        jobs: Arc<dyn IngestJobStore>,
        storage: Arc<dyn ObjectStorage>,
        parser: Arc<dyn ProgramParser>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            jobs,
            storage,
            parser,
            bucket: bucket.into(),
        }
    }

    /// A failure after the job is loaded marks it `failed` with the error text.
    pub async fn process(&self, job_id: Uuid) -> Result<(), AppError> {
        let job = self
            .jobs
            .find_job(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ingest job {} not found", job_id)))?;

        self.jobs.set_status(job_id, IngestStatus::Processing, None).await?;

        match self.run(&job).await {
            Ok(()) => {
                self.jobs.set_status(job_id, IngestStatus::Succeeded, None).await?;
                info!("Ingest job {} succeeded", job_id);
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                error!("Ingest job {} failed: {}", job_id, message);
                if let Err(store_error) = self
                    .jobs
                    .set_status(job_id, IngestStatus::Failed, Some(&message))
                    .await
                {
                    warn!("Could not mark ingest job {} failed: {}", job_id, store_error);
                }
                Err(e)
            }
        }
    }

    async fn run(&self, job: &IngestJob) -> Result<(), AppError> {
        let text = self.source_text(job).await?;
        self.jobs.save_raw_text(job.id, &text).await?;

        let parsed = self.parser.parse(&text).await.map_err(|e| AppError::Upstream {
            context: "Failed to parse program".to_string(),
            details: e.to_string(),
        })?;

        self.jobs.insert_result(job.id, &parsed, self.parser.model()).await?;
        Ok(())
    }

    async fn source_text(&self, job: &IngestJob) -> Result<String, AppError> {
        match job.source.as_str() {
            "text" => Ok(job.raw_text.clone().unwrap_or_default()),
            "file" => {
                let path = job
                    .storage_path
                    .as_deref()
                    .filter(|path| !path.is_empty())
                    .ok_or_else(|| AppError::invalid("File job has no storage_path"))?;

                let bytes = self
                    .storage
                    .download(&self.bucket, path)
                    .await
                    .map_err(|e| AppError::storage("Failed to download file", e))?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            other => Err(AppError::invalid(format!("Unsupported job source: {}", other))),
        }
    }
}
