use anyhow::{Context, Result};
use sqlx::{Executor, FromRow, PgPool};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::config::run_migrations;

#[derive(Debug, Clone, FromRow)]
pub struct AppliedMigration {
    pub version: i64,
    pub description: String,
    pub success: bool,
}

/// Applies the crate's versioned migrations or a one-off SQL file.
#[derive(Clone)]
pub struct MigrationService {
    db: PgPool,
}

impl MigrationService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Apply pending embedded migrations and return the full applied history.
    pub async fn apply_pending(&self) -> Result<Vec<AppliedMigration>> {
        run_migrations(&self.db)
            .await
            .context("Failed to apply embedded migrations")?;

        let applied = sqlx::query_as::<_, AppliedMigration>(
            "SELECT version, description, success FROM _sqlx_migrations ORDER BY version",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(applied)
    }

    /// Run every statement in `path` as one simple-protocol batch.
    pub async fn apply_file(&self, path: &Path) -> Result<Duration> {
        let sql = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read migration file {}", path.display()))?;

        let started = Instant::now();
        self.db
            .execute(sql.as_str())
            .await
            .with_context(|| format!("Migration {} failed", path.display()))?;
        let elapsed = started.elapsed();

        tracing::info!("Applied {} in {:.2}s", path.display(), elapsed.as_secs_f64());
        Ok(elapsed)
    }
}
