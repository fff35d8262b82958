// Business logic services

pub mod account_service;
pub mod account_store;
pub mod ai_usage_service;
pub mod calendar_repository;
pub mod calendar_service;
pub mod command_runner;
pub mod deployment_tools;
pub mod ingest_job_store;
pub mod migration_service;
pub mod notification_service;
pub mod onesignal_client;
pub mod program_ingest_service;
pub mod program_parser;
pub mod reminder_service;
pub mod reminder_store;
pub mod schema_inspector;
pub mod storage_client;
pub mod workout_plan_repository;

pub use account_service::AccountService;
pub use account_store::{AccountStore, PgAccountStore};
pub use ai_usage_service::AiUsageService;
pub use calendar_repository::{CalendarRepository, PgCalendarRepository};
pub use calendar_service::CalendarService;
pub use command_runner::{CommandError, CommandExecutor, CommandRunner};
pub use deployment_tools::{DeploymentTools, ToolError};
pub use ingest_job_store::{IngestJobStore, PgIngestJobStore};
pub use migration_service::{AppliedMigration, MigrationService};
pub use notification_service::NotificationService;
pub use onesignal_client::{OneSignalClient, ProviderError, PushProvider};
pub use program_ingest_service::ProgramIngestService;
pub use program_parser::{OpenAiProgramParser, ParserError, ProgramParser};
pub use reminder_service::ReminderService;
pub use reminder_store::{InMemoryReminderStore, PgReminderStore, ReminderStore};
pub use schema_inspector::SchemaInspector;
pub use storage_client::{ObjectStorage, StorageError, SupabaseStorageClient};
pub use workout_plan_repository::{InMemoryWorkoutPlanRepository, PgWorkoutPlanRepository, WorkoutPlanRepository};
