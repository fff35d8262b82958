mod inspect;
mod migrate;
mod serve;
mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use inspect::InspectCommand;
pub use migrate::MigrateCommand;
pub use serve::ServeCommand;
pub use tools::ToolsCommand;

#[derive(Parser)]
#[command(name = "coach-ops")]
#[command(about = "Push notification functions and deployment tooling for the coaching backend", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP functions server
    Serve(ServeCommand),

    /// Apply pending migrations, or one SQL file with --file
    Migrate(MigrateCommand),

    /// Inspect the database schema and usage statistics
    #[command(subcommand)]
    Inspect(InspectCommand),

    /// List or run deployment tools
    #[command(subcommand)]
    Tools(ToolsCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        if self.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        match self.command {
            Commands::Serve(cmd) => cmd.execute().await,
            Commands::Migrate(cmd) => cmd.execute().await,
            Commands::Inspect(cmd) => cmd.execute().await,
            Commands::Tools(cmd) => cmd.execute().await,
        }
    }
}
