use anyhow::{bail, Result};
use clap::Subcommand;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::models::RelationKind;
use crate::services::SchemaInspector;

#[derive(Subcommand)]
pub enum InspectCommand {
    /// List tables and views
    Tables {
        /// Only names containing this text
        #[arg(short, long)]
        filter: Option<String>,

        /// Schema to inspect
        #[arg(long, default_value = "public")]
        schema: String,
    },

    /// Show the columns of a table
    Describe {
        table: String,

        #[arg(long, default_value = "public")]
        schema: String,
    },

    /// Report whether a name is a table, a view, or missing
    Kind {
        name: String,

        #[arg(long, default_value = "public")]
        schema: String,
    },

    /// Server version, database size and connection count
    Health,

    /// Profile counts per role
    Users,

    /// Recent coach-client links
    CoachClients {
        /// Only links of this coach
        #[arg(long)]
        coach_id: Option<Uuid>,
    },

    /// Recent monthly AI token usage
    AiUsage {
        /// Only rows of this user
        #[arg(long)]
        user_id: Option<Uuid>,
    },
}

impl InspectCommand {
    pub async fn execute(self) -> Result<()> {
        let pool = DatabaseConfig::from_env()?.create_pool().await?;
        let inspector = SchemaInspector::new(pool);

        match self {
            InspectCommand::Tables { filter, schema } => {
                let tables = inspector.with_schema(schema).list_tables(filter.as_deref()).await?;
                if tables.is_empty() {
                    println!("No tables found.");
                }
                for table in tables {
                    println!("  {:<40} {}", table.table_name, table.table_type);
                }
            }
            InspectCommand::Describe { table, schema } => {
                let columns = inspector.with_schema(schema).describe_table(&table).await?;
                if columns.is_empty() {
                    bail!("Table {} not found", table);
                }
                println!("{}:", table);
                for column in columns {
                    println!(
                        "  {:<32} {:<28} nullable={:<3} default={}",
                        column.column_name,
                        column.data_type,
                        column.is_nullable,
                        column.column_default.as_deref().unwrap_or("-")
                    );
                }
            }
            InspectCommand::Kind { name, schema } => {
                let inspector = inspector.with_schema(schema);
                let kind = inspector.relation_kind(&name).await?;
                println!("{}: {}", name, kind);
                if kind == RelationKind::View {
                    if let Some(definition) = inspector.view_definition(&name).await? {
                        println!("{}", definition.trim());
                    }
                }
            }
            InspectCommand::Health => {
                let health = inspector.health().await?;
                println!("✓ Connected");
                println!("  Version:     {}", health.server_version);
                println!("  Size:        {}", health.database_size);
                println!("  Connections: {}", health.connection_count);
            }
            InspectCommand::Users => {
                println!("User Statistics by Role:");
                for count in inspector.user_stats().await? {
                    println!("- {}: {} users", count.role, count.user_count);
                }
            }
            InspectCommand::CoachClients { coach_id } => {
                let links = inspector.coach_clients(coach_id).await?;
                if links.is_empty() {
                    println!("No coach-client links found.");
                }
                for link in links {
                    println!(
                        "- Coach: {} → Client: {} ({})",
                        link.coach_name.as_deref().unwrap_or("-"),
                        link.client_name.as_deref().unwrap_or("-"),
                        link.status.as_deref().unwrap_or("unknown")
                    );
                }
            }
            InspectCommand::AiUsage { user_id } => {
                println!("AI Usage Statistics:");
                for row in inspector.ai_usage_stats(user_id).await? {
                    println!(
                        "- {}: {} tokens ({}/{})",
                        row.user_name.as_deref().unwrap_or("-"),
                        row.tokens_used,
                        row.month,
                        row.year
                    );
                }
            }
        }

        Ok(())
    }
}
