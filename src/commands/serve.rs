use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::api::{create_routes, AppState};
use crate::auth::JwtVerifier;
use crate::config::{AppConfig, DatabaseConfig, OneSignalConfig, OpenAiConfig, SupabaseConfig};
use crate::services::{
    AccountService, AiUsageService, CalendarService, NotificationService, ObjectStorage, OneSignalClient,
    OpenAiProgramParser, PgAccountStore, PgCalendarRepository, PgIngestJobStore, PgReminderStore,
    PgWorkoutPlanRepository, ProgramIngestService, PushProvider, ReminderService, SupabaseStorageClient,
};

#[derive(Args)]
pub struct ServeCommand {
    /// Override the PORT environment variable
    #[arg(short, long)]
    port: Option<u16>,
}

impl ServeCommand {
    pub async fn execute(self) -> Result<()> {
        let mut app_config = AppConfig::from_env()?;
        if let Some(port) = self.port {
            app_config.port = port;
        }

        let db_config = DatabaseConfig::from_env()?;
        info!("Connecting to database at {}", db_config.redacted_target());
        let pool = db_config
            .create_pool()
            .await
            .context("Failed to connect to the database")?;

        let onesignal_config = OneSignalConfig::from_env()?;
        let provider: Arc<dyn PushProvider> = Arc::new(OneSignalClient::new(&onesignal_config)?);

        let supabase_config = SupabaseConfig::from_env()?;
        let storage: Arc<dyn ObjectStorage> = Arc::new(SupabaseStorageClient::new(&supabase_config)?);

        let openai_config = OpenAiConfig::from_env();
        if openai_config.api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY is not set; program ingest jobs will fail");
        }
        let parser = Arc::new(OpenAiProgramParser::new(&openai_config)?);

        let state = AppState {
            jwt: JwtVerifier::new(&supabase_config.jwt_secret),
            notification_service: NotificationService::new(provider.clone()),
            reminder_service: ReminderService::new(
                provider,
                Arc::new(PgReminderStore::new(pool.clone())),
                Arc::new(PgWorkoutPlanRepository::new(pool.clone())),
            ),
            ai_usage_service: AiUsageService::new(pool.clone()),
            account_service: AccountService::new(
                Arc::new(PgAccountStore::new(pool.clone())),
                storage.clone(),
                supabase_config.media_bucket.clone(),
            ),
            calendar_service: CalendarService::new(Arc::new(PgCalendarRepository::new(pool.clone()))),
            ingest_service: ProgramIngestService::new(
                Arc::new(PgIngestJobStore::new(pool)),
                storage,
                parser,
                supabase_config.ingest_bucket.clone(),
            ),
        };

        let app = create_routes(state);

        let address = app_config.server_address();
        let listener = TcpListener::bind(&address).await?;
        info!("coach-ops server starting on http://{} ({})", address, app_config.environment);
        if app_config.is_development() {
            info!("Health check available at http://{}/health", address);
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
