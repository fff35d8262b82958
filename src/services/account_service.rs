use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{DataExport, DataExportLink, DeletionReceipt, NewDataExport};
use crate::services::{AccountStore, ObjectStorage};

/// Tables exported per user, each filtered on its `user_id` column.
pub const EXPORT_TABLES: [&str; 14] = [
    "nutrition_plans",
    "workout_plans",
    "workout_weeks",
    "workout_days",
    "exercises",
    "exercise_logs",
    "checkins",
    "client_metrics",
    "messages",
    "user_files",
    "progress_photos",
    "coach_notes",
    "file_tags",
    "file_comments",
];

pub const ADMIN_ROLES: [&str; 2] = ["admin", "superadmin"];

pub const EXPORT_LINK_TTL_SECS: u64 = 3600;

pub const FORBIDDEN_MESSAGE: &str = "Forbidden: Admin access required";

/// Personal-data export and admin-driven account deletion.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn AccountStore>,
    storage: Arc<dyn ObjectStorage>,
    media_bucket: String,
}

impl AccountService {
    pub fn new(store: Arc<dyn AccountStore>, storage: Arc<dyn ObjectStorage>, media_bucket: impl Into<String>) -> Self {
        Self {
            store,
            storage,
            media_bucket: media_bucket.into(),
        }
    }

    /// Gather the user's rows. A table that cannot be read exports as `[]`.
    pub async fn collect_user_data(&self, user_id: Uuid) -> BTreeMap<String, Vec<Value>> {
        let mut bundle = BTreeMap::new();

        for table in EXPORT_TABLES {
            let rows = match self.store.fetch_rows(table, user_id).await {
                Ok(rows) => rows,
                Err(e) => {
                    warn!("Failed to fetch {} for user {}: {}", table, user_id, e);
                    Vec::new()
                }
            };
            bundle.insert(table.to_string(), rows);
        }

        let profile = match self.store.fetch_profile(user_id).await {
            Ok(profile) => profile.into_iter().collect(),
            Err(e) => {
                warn!("Failed to fetch profile for user {}: {}", user_id, e);
                Vec::new()
            }
        };
        bundle.insert("profile".to_string(), profile);

        bundle
    }

    pub async fn export_user_data(&self, user_id: Uuid) -> Result<DataExportLink, AppError> {
        self.export_user_data_at(user_id, Utc::now()).await
    }

    /// Upload the bundle as JSON and hand back a signed link valid for an hour.
    pub async fn export_user_data_at(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<DataExportLink, AppError> {
        info!("Exporting data for user {}", user_id);

        let export = DataExport {
            exported_at: now,
            user_id,
            data: self.collect_user_data(user_id).await,
        };
        let body = serde_json::to_vec_pretty(&export).map_err(anyhow::Error::from)?;

        let path = format!("exports/{}/{}.json", user_id, now.timestamp_millis());
        self.storage
            .upload(&self.media_bucket, &path, "application/json", body)
            .await
            .map_err(|e| AppError::storage("Failed to upload export", e))?;

        let url = self
            .storage
            .create_signed_url(&self.media_bucket, &path, EXPORT_LINK_TTL_SECS)
            .await
            .map_err(|e| AppError::storage("Failed to sign export URL", e))?;

        let expires_at = now + Duration::seconds(EXPORT_LINK_TTL_SECS as i64);
        let record = NewDataExport {
            user_id,
            export_url: url.clone(),
            expires_at,
            completed_at: now,
        };
        if let Err(e) = self.store.record_export(&record).await {
            warn!("Export for user {} uploaded but not recorded: {}", user_id, e);
        }

        info!("Export complete for user {}", user_id);
        Ok(DataExportLink { url, expires_at })
    }

    /// Only `admin` and `superadmin` profiles pass.
    pub async fn require_admin(&self, user_id: Uuid) -> Result<(), AppError> {
        let role = self.store.find_role(user_id).await?;
        match role.as_deref() {
            Some(role) if ADMIN_ROLES.contains(&role) => Ok(()),
            _ => Err(AppError::Forbidden(FORBIDDEN_MESSAGE.to_string())),
        }
    }

    pub async fn process_deletion(&self, admin_id: Uuid, user_id: Uuid) -> Result<DeletionReceipt, AppError> {
        self.process_deletion_at(admin_id, user_id, Utc::now()).await
    }

    /// Anonymize the account, then remove its uploaded files.
    ///
    /// File removal is best-effort: the account is already scrubbed when it runs.
    pub async fn process_deletion_at(
        &self,
        admin_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<DeletionReceipt, AppError> {
        info!("Processing deletion for user {} by admin {}", user_id, admin_id);

        self.store.anonymize(user_id, admin_id, now).await?;
        self.remove_user_files(user_id).await;

        info!("Deletion processed for user {}", user_id);
        Ok(DeletionReceipt {
            ok: true,
            user_id,
            processed_at: now,
            processed_by: admin_id,
        })
    }

    async fn remove_user_files(&self, user_id: Uuid) {
        let prefix = format!("user_files/{}", user_id);

        let names = match self.storage.list(&self.media_bucket, &prefix).await {
            Ok(names) => names,
            Err(e) => {
                warn!("Could not list files for user {}: {}", user_id, e);
                return;
            }
        };

        let paths: Vec<String> = names.iter().map(|name| format!("{}/{}", prefix, name)).collect();
        if let Err(e) = self.storage.remove(&self.media_bucket, &paths).await {
            warn!("Could not remove files for user {}: {}", user_id, e);
        }
    }
}
