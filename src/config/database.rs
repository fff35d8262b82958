use anyhow::{anyhow, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
}

impl DatabaseConfig {
    /// `SUPABASE_DB_URL` wins over `DATABASE_URL`. There is no built-in
    /// fallback: credentials only ever come from the environment.
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("SUPABASE_DB_URL")
            .or_else(|_| env::var("DATABASE_URL"))
            .map_err(|_| anyhow!("SUPABASE_DB_URL or DATABASE_URL must be set"))?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| "1".to_string())
            .parse()
            .unwrap_or(1);

        let connect_timeout_secs = env::var("DB_CONNECT_TIMEOUT")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT")
            .unwrap_or_else(|_| "600".to_string())
            .parse()
            .unwrap_or(600);

        Ok(DatabaseConfig {
            database_url,
            max_connections,
            min_connections,
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            idle_timeout: Duration::from_secs(idle_timeout_secs),
        })
    }

    pub async fn create_pool(&self) -> Result<PgPool> {
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.connect_timeout)
            .idle_timeout(Some(self.idle_timeout))
            .connect(&self.database_url)
            .await?;

        Ok(pool)
    }

    /// Pool that opens connections on first use, for commands that may not touch the database.
    pub fn create_lazy_pool(&self) -> Result<PgPool> {
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.connect_timeout)
            .connect_lazy(&self.database_url)?;

        Ok(pool)
    }

    /// Host and database name only, for log lines.
    pub fn redacted_target(&self) -> String {
        let after_scheme = self
            .database_url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.database_url);
        let host_part = after_scheme
            .rsplit_once('@')
            .map(|(_, host)| host)
            .unwrap_or(after_scheme);
        host_part.split('?').next().unwrap_or(host_part).to_string()
    }
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
