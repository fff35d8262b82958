use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use coach_ops::errors::AppError;
use coach_ops::services::account_service::{EXPORT_TABLES, FORBIDDEN_MESSAGE};
use coach_ops::services::AccountService;
use crate::common::{init_test_logging, MemoryAccountStore, MemoryStorage};

#[cfg(test)]
mod account_service_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn service(store: Arc<MemoryAccountStore>, storage: Arc<MemoryStorage>) -> AccountService {
        AccountService::new(store, storage, "media")
    }

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 5, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_unreadable_table_exports_as_empty_list() {
        init_test_logging();
        let store = Arc::new(
            MemoryAccountStore::new()
                .with_rows("checkins", vec![json!({ "id": 1, "weight": 80.5 })])
                .failing("coach_notes")
                .with_profile(json!({ "id": "p", "full_name": "Sam" })),
        );
        let service = service(store, Arc::new(MemoryStorage::new()));

        let bundle = service.collect_user_data(Uuid::new_v4()).await;

        assert_eq!(bundle.len(), EXPORT_TABLES.len() + 1);
        assert_eq!(bundle["checkins"], vec![json!({ "id": 1, "weight": 80.5 })]);
        assert_eq!(bundle["coach_notes"], Vec::<Value>::new());
        assert_eq!(bundle["profile"].len(), 1);
    }

    #[tokio::test]
    async fn test_export_uploads_bundle_and_records_link() {
        let user_id = Uuid::new_v4();
        let store = Arc::new(MemoryAccountStore::new().with_rows("messages", vec![json!({ "body": "hi" })]));
        let storage = Arc::new(MemoryStorage::new());
        let service = service(store.clone(), storage.clone());

        let link = service.export_user_data_at(user_id, now()).await.unwrap();

        let key = format!("media/exports/{}/{}.json", user_id, now().timestamp_millis());
        assert_eq!(storage.keys(), vec![key.clone()]);

        let uploaded: Value = serde_json::from_slice(&storage.object(&key).unwrap()).unwrap();
        assert_eq!(uploaded["user_id"], user_id.to_string());
        assert_eq!(uploaded["data"]["messages"], json!([{ "body": "hi" }]));
        assert_eq!(uploaded["data"]["profile"], json!([]));

        assert!(link.url.contains("expires=3600"));
        assert_eq!(link.expires_at, now() + chrono::Duration::hours(1));

        let exports = store.exports();
        assert_eq!(exports.len(), 1);
        assert_eq!(exports[0].export_url, link.url);
    }

    #[tokio::test]
    async fn test_upload_failure_is_upstream_and_nothing_recorded() {
        let store = Arc::new(MemoryAccountStore::new());
        let storage = Arc::new(MemoryStorage {
            fail_uploads: true,
            ..MemoryStorage::default()
        });
        let service = service(store.clone(), storage);

        let result = service.export_user_data_at(Uuid::new_v4(), now()).await;

        assert_matches!(result, Err(AppError::Upstream { ref context, ref details }) => {
            assert_eq!(context, "Failed to upload export");
            assert_eq!(details, r#"{"error":"Bucket not found"}"#);
        });
        assert!(store.exports().is_empty());
    }

    #[tokio::test]
    async fn test_only_admin_roles_pass() {
        let admin = Uuid::new_v4();
        let superadmin = Uuid::new_v4();
        let coach = Uuid::new_v4();
        let store = Arc::new(
            MemoryAccountStore::new()
                .with_role(admin, "admin")
                .with_role(superadmin, "superadmin")
                .with_role(coach, "coach"),
        );
        let service = service(store, Arc::new(MemoryStorage::new()));

        assert!(service.require_admin(admin).await.is_ok());
        assert!(service.require_admin(superadmin).await.is_ok());
        assert_matches!(service.require_admin(coach).await, Err(AppError::Forbidden(ref m)) if m == FORBIDDEN_MESSAGE);
        assert_matches!(service.require_admin(Uuid::new_v4()).await, Err(AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_deletion_anonymizes_and_removes_user_files() {
        let admin = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let store = Arc::new(MemoryAccountStore::new());
        let storage = Arc::new(
            MemoryStorage::new()
                .with_object("media", &format!("user_files/{}/a.jpg", user_id), b"a")
                .with_object("media", &format!("user_files/{}/b.pdf", user_id), b"b")
                .with_object("media", "user_files/someone-else/c.jpg", b"c"),
        );
        let service = service(store.clone(), storage.clone());

        let receipt = service.process_deletion_at(admin, user_id, now()).await.unwrap();

        assert!(receipt.ok);
        assert_eq!(receipt.user_id, user_id);
        assert_eq!(receipt.processed_by, admin);
        assert_eq!(receipt.processed_at, now());
        assert_eq!(store.anonymized(), vec![(user_id, admin)]);
        assert_eq!(storage.removed().len(), 2);
        assert_eq!(storage.keys(), vec!["media/user_files/someone-else/c.jpg".to_string()]);
    }

    #[tokio::test]
    async fn test_storage_listing_failure_does_not_fail_deletion() {
        let store = Arc::new(MemoryAccountStore::new());
        let storage = Arc::new(MemoryStorage {
            fail_listing: true,
            ..MemoryStorage::default()
        });
        let service = service(store.clone(), storage);

        let receipt = service.process_deletion_at(Uuid::new_v4(), Uuid::new_v4(), now()).await;

        assert!(receipt.is_ok());
        assert_eq!(store.anonymized().len(), 1);
    }

    #[tokio::test]
    async fn test_database_failure_aborts_deletion_before_storage() {
        let user_id = Uuid::new_v4();
        let store = Arc::new(MemoryAccountStore {
            fail_anonymize: true,
            ..MemoryAccountStore::default()
        });
        let storage = Arc::new(MemoryStorage::new().with_object("media", &format!("user_files/{}/a.jpg", user_id), b"a"));
        let service = service(store, storage.clone());

        let result = service.process_deletion_at(Uuid::new_v4(), user_id, now()).await;

        assert_matches!(result, Err(AppError::Database(_)));
        assert!(storage.removed().is_empty());
    }
}
