use anyhow::{bail, Context, Result};
use clap::Subcommand;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::{DatabaseConfig, ToolsConfig};
use crate::services::{CommandRunner, DeploymentTools, MigrationService};

#[derive(Subcommand)]
pub enum ToolsCommand {
    /// List the available tools and their arguments
    List {
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run one tool
    Call {
        /// Tool name, e.g. deploy_to_github
        name: String,

        /// Tool arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },
}

impl ToolsCommand {
    pub async fn execute(self) -> Result<()> {
        match self {
            ToolsCommand::List { json } => {
                let tools = DeploymentTools::list_tools();
                if json {
                    println!("{}", serde_json::to_string_pretty(&tools)?);
                } else {
                    for tool in tools {
                        println!("  {:<26} {}", tool.name, tool.description);
                    }
                }
                Ok(())
            }
            ToolsCommand::Call { name, args } => {
                let args: Value = serde_json::from_str(&args).context("--args must be valid JSON")?;
                let config = ToolsConfig::from_env()?;

                let runner = Arc::new(CommandRunner::new(config.command_timeout));
                let mut tools = DeploymentTools::new(runner, &config);
                if config.database_url.is_some() {
                    let pool = DatabaseConfig::from_env()?.create_lazy_pool()?;
                    tools = tools.with_migrations(MigrationService::new(pool));
                }

                let cancel = CancellationToken::new();
                let trigger = cancel.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        tracing::warn!("Interrupted, stopping the running command");
                        trigger.cancel();
                    }
                });

                let report = tools.call(&name, args, &cancel).await?;
                print!("{}", report.render());

                if !report.success {
                    bail!("{} failed", report.tool);
                }
                Ok(())
            }
        }
    }
}
