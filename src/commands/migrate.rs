use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::config::DatabaseConfig;
use crate::services::MigrationService;

#[derive(Args)]
pub struct MigrateCommand {
    /// Execute a single SQL file instead of the embedded migrations
    #[arg(short, long)]
    file: Option<PathBuf>,
}

impl MigrateCommand {
    pub async fn execute(self) -> Result<()> {
        let db_config = DatabaseConfig::from_env()?;
        println!("Connecting to {}...", db_config.redacted_target());
        let pool = db_config.create_pool().await?;
        let migrations = MigrationService::new(pool);

        match self.file {
            Some(path) => {
                println!("Running migration {}...", path.display());
                let elapsed = migrations.apply_file(&path).await?;
                println!("✓ Migration completed in {:.2}s", elapsed.as_secs_f64());
            }
            None => {
                let applied = migrations.apply_pending().await?;
                println!("✓ Database is up to date ({} migrations applied)", applied.len());
                for migration in applied {
                    let marker = if migration.success { "✓" } else { "✗" };
                    println!("  {} {:>4} {}", marker, migration.version, migration.description);
                }
            }
        }

        Ok(())
    }
}
