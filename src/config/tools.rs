use anyhow::Result;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Settings for the deployment tool runner
#[derive(Debug, Clone)]
pub struct ToolsConfig {
    pub workdir: PathBuf,
    pub command_timeout: Duration,
    /// Passed to `supabase db push`; taken from the same variables as the pool.
    pub database_url: Option<String>,
}

impl ToolsConfig {
    pub fn from_env() -> Result<Self> {
        let workdir = match env::var("DEPLOY_WORKDIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => env::current_dir()?,
        };
        let timeout_secs = env::var("DEPLOY_COMMAND_TIMEOUT_SECS")
            .unwrap_or_else(|_| "600".to_string())
            .parse()
            .unwrap_or(600);
        let database_url = env::var("SUPABASE_DB_URL")
            .or_else(|_| env::var("DATABASE_URL"))
            .ok();

        Ok(Self {
            workdir,
            command_timeout: Duration::from_secs(timeout_secs),
            database_url,
        })
    }
}
