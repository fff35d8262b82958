use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use coach_ops::commands::Cli;
use coach_ops::config::{load_dotenv, AppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();

    let cli = Cli::parse();

    // RUST_LOG wins, then LOG_LEVEL, then info
    let default_level = if cli.verbose {
        "debug".to_string()
    } else {
        AppConfig::from_env()?.log_level
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    cli.execute().await
}
