use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A queued request to turn an uploaded coaching program into structured JSON.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct IngestJob {
    pub id: Uuid,
    /// `file` (read from storage) or `text` (read from `raw_text`).
    pub source: String,
    pub storage_path: Option<String>,
    pub raw_text: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStatus {
    Processing,
    Succeeded,
    Failed,
}

impl IngestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestStatus::Processing => "processing",
            IngestStatus::Succeeded => "succeeded",
            IngestStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgramIngestRequest {
    #[serde(default, rename = "jobId", alias = "job_id")]
    pub job_id: Option<String>,
}
