use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Everything exported for one user, keyed by source table. `profile` holds
/// zero or one row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataExport {
    pub exported_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub data: BTreeMap<String, Vec<Value>>,
}

/// Response of `export-user-data`: a time-limited download link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataExportLink {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// Row written to `data_exports` once the file is uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDataExport {
    pub user_id: Uuid,
    pub export_url: String,
    pub expires_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeletionRequest {
    #[serde(default, rename = "userId", alias = "user_id")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionReceipt {
    pub ok: bool,
    pub user_id: Uuid,
    pub processed_at: DateTime<Utc>,
    pub processed_by: Uuid,
}
