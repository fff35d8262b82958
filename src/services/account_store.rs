use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::NewDataExport;

/// Reads and writes behind the export and deletion functions.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Every row of `table` whose `user_id` matches, as JSON objects.
    async fn fetch_rows(&self, table: &str, user_id: Uuid) -> Result<Vec<Value>, sqlx::Error>;

    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Value>, sqlx::Error>;

    async fn record_export(&self, export: &NewDataExport) -> Result<(), sqlx::Error>;

    async fn find_role(&self, user_id: Uuid) -> Result<Option<String>, sqlx::Error>;

    /// Scrub the profile's personal fields and close the user's delete requests.
    async fn anonymize(
        &self,
        user_id: Uuid,
        processed_by: Uuid,
        processed_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error>;
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[derive(Clone)]
pub struct PgAccountStore {
    db: PgPool,
}

impl PgAccountStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn fetch_rows(&self, table: &str, user_id: Uuid) -> Result<Vec<Value>, sqlx::Error> {
        let query = format!(
            "SELECT COALESCE(json_agg(t), '[]'::json) FROM {} t WHERE t.user_id = $1",
            quote_identifier(table)
        );

        let rows: Value = sqlx::query_scalar(&query)
            .bind(user_id)
            .fetch_one(&self.db)
            .await?;

        Ok(match rows {
            Value::Array(rows) => rows,
            other => vec![other],
        })
    }

    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Value>, sqlx::Error> {
        sqlx::query_scalar("SELECT row_to_json(p) FROM profiles p WHERE p.id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
    }

    async fn record_export(&self, export: &NewDataExport) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO data_exports (user_id, status, export_url, expires_at, completed_at)
            VALUES ($1, 'ready', $2, $3, $4)
            "#,
        )
        .bind(export.user_id)
        .bind(&export.export_url)
        .bind(export.expires_at)
        .bind(export.completed_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn find_role(&self, user_id: Uuid) -> Result<Option<String>, sqlx::Error> {
        let role: Option<Option<String>> = sqlx::query_scalar("SELECT role::text FROM profiles WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(role.flatten())
    }

    async fn anonymize(
        &self,
        user_id: Uuid,
        processed_by: Uuid,
        processed_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            UPDATE profiles
            SET full_name = 'Deleted User', avatar_url = NULL, bio = NULL, email = $2
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(format!("deleted_{}@example.com", user_id))
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE delete_requests
            SET status = 'done', processed_at = $2, processed_by = $3
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(processed_at)
        .bind(processed_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }
}
