// Process configuration, read once at startup and passed to every collaborator

pub mod app;
pub mod database;
pub mod openai;
pub mod push;
pub mod supabase;
pub mod tools;

pub use app::AppConfig;
pub use database::{run_migrations, DatabaseConfig};
pub use openai::OpenAiConfig;
pub use push::OneSignalConfig;
pub use supabase::SupabaseConfig;
pub use tools::ToolsConfig;

/// Load a `.env` file from the working directory if one exists.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
    }
}
