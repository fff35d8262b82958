use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    AiUsageSummary, CoachClientLink, ColumnInfo, DatabaseHealth, RelationKind, RoleCount, TableSummary,
};

/// Read-only diagnostics against `information_schema`, the pg catalogs and a
/// few application tables.
#[derive(Clone)]
pub struct SchemaInspector {
    db: PgPool,
    schema: String,
}

impl SchemaInspector {
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            schema: "public".to_string(),
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    pub async fn list_tables(&self, name_filter: Option<&str>) -> Result<Vec<TableSummary>> {
        let pattern = name_filter
            .map(|f| format!("%{}%", f))
            .unwrap_or_else(|| "%".to_string());

        let tables = sqlx::query_as::<_, TableSummary>(
            r#"
            SELECT table_name::text AS table_name, table_type::text AS table_type
            FROM information_schema.tables
            WHERE table_schema = $1 AND table_name LIKE $2
            ORDER BY table_name
            "#,
        )
        .bind(&self.schema)
        .bind(pattern)
        .fetch_all(&self.db)
        .await?;

        Ok(tables)
    }

    /// Columns in ordinal order; empty when the table does not exist.
    pub async fn describe_table(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let columns = sqlx::query_as::<_, ColumnInfo>(
            r#"
            SELECT column_name::text AS column_name,
                   data_type::text AS data_type,
                   is_nullable::text AS is_nullable,
                   column_default::text AS column_default
            FROM information_schema.columns
            WHERE table_schema = $1 AND table_name = $2
            ORDER BY ordinal_position
            "#,
        )
        .bind(&self.schema)
        .bind(table)
        .fetch_all(&self.db)
        .await?;

        Ok(columns)
    }

    pub async fn relation_kind(&self, name: &str) -> Result<RelationKind> {
        let (is_table, is_view): (bool, bool) = sqlx::query_as(
            r#"
            SELECT
                EXISTS (
                    SELECT 1 FROM information_schema.tables
                    WHERE table_schema = $1 AND table_name = $2 AND table_type = 'BASE TABLE'
                ),
                EXISTS (
                    SELECT 1 FROM information_schema.views
                    WHERE table_schema = $1 AND table_name = $2
                )
            "#,
        )
        .bind(&self.schema)
        .bind(name)
        .fetch_one(&self.db)
        .await?;

        Ok(match (is_table, is_view) {
            (true, _) => RelationKind::Table,
            (false, true) => RelationKind::View,
            _ => RelationKind::NotFound,
        })
    }

    pub async fn view_definition(&self, name: &str) -> Result<Option<String>> {
        let definition: Option<(Option<String>,)> = sqlx::query_as(
            "SELECT definition FROM pg_views WHERE schemaname = $1 AND viewname = $2",
        )
        .bind(&self.schema)
        .bind(name)
        .fetch_optional(&self.db)
        .await?;

        Ok(definition.and_then(|(d,)| d))
    }

    pub async fn health(&self) -> Result<DatabaseHealth> {
        let (server_version, database_size, connection_count): (String, String, i64) = sqlx::query_as(
            r#"
            SELECT
                current_setting('server_version'),
                pg_size_pretty(pg_database_size(current_database())),
                (SELECT count(*) FROM pg_stat_activity WHERE datname = current_database())
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        Ok(DatabaseHealth {
            server_version,
            database_size,
            connection_count,
        })
    }

    /// Profile counts per role, largest first.
    pub async fn user_stats(&self) -> Result<Vec<RoleCount>> {
        let counts = sqlx::query_as::<_, RoleCount>(
            r#"
            SELECT COALESCE(role::text, 'unknown') AS role, COUNT(*) AS user_count
            FROM profiles
            GROUP BY 1
            ORDER BY user_count DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(counts)
    }

    /// The 20 most recent coach-client links, optionally for one coach.
    pub async fn coach_clients(&self, coach_id: Option<Uuid>) -> Result<Vec<CoachClientLink>> {
        let links = sqlx::query_as::<_, CoachClientLink>(
            r#"
            SELECT cc.coach_id, p1.name::text AS coach_name,
                   cc.client_id, p2.name::text AS client_name,
                   cc.status::text AS status, cc.created_at
            FROM user_coach_links cc
            JOIN profiles p1 ON cc.coach_id = p1.id
            JOIN profiles p2 ON cc.client_id = p2.id
            WHERE $1::uuid IS NULL OR cc.coach_id = $1
            ORDER BY cc.created_at DESC
            LIMIT 20
            "#,
        )
        .bind(coach_id)
        .fetch_all(&self.db)
        .await?;

        Ok(links)
    }

    /// The 10 most recently updated monthly usage rows, optionally for one user.
    pub async fn ai_usage_stats(&self, user_id: Option<Uuid>) -> Result<Vec<AiUsageSummary>> {
        let rows = sqlx::query_as::<_, AiUsageSummary>(
            r#"
            SELECT au.user_id, p.name::text AS user_name, au.month, au.year,
                   au.tokens_used, au.updated_at
            FROM ai_usage au
            JOIN profiles p ON au.user_id = p.id
            WHERE $1::uuid IS NULL OR au.user_id = $1
            ORDER BY au.updated_at DESC
            LIMIT 10
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }
}
