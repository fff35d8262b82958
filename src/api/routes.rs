use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::account::{export_user_data, process_delete};
use super::ai_usage::update_ai_usage;
use super::calendar::calendar_conflicts;
use super::health::health_check;
use super::notifications::send_notification;
use super::program_ingest::program_ingest;
use super::reminders::{cancel_workout_reminders, schedule_workout_reminders};
use crate::auth::JwtVerifier;
use crate::errors::AppError;
use crate::services::{
    AccountService, AiUsageService, CalendarService, NotificationService, ProgramIngestService,
    ReminderService,
};

#[derive(Clone)]
pub struct AppState {
    pub jwt: JwtVerifier,
    pub notification_service: NotificationService,
    pub reminder_service: ReminderService,
    pub ai_usage_service: AiUsageService,
    pub account_service: AccountService,
    pub calendar_service: CalendarService,
    pub ingest_service: ProgramIngestService,
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

pub fn create_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let functions = Router::new()
        .route(
            "/send-notification",
            post(send_notification).fallback(method_not_allowed),
        )
        .route(
            "/schedule-workout-reminders",
            post(schedule_workout_reminders).fallback(method_not_allowed),
        )
        .route(
            "/cancel-workout-reminders",
            post(cancel_workout_reminders).fallback(method_not_allowed),
        )
        .route(
            "/update-ai-usage",
            post(update_ai_usage).fallback(method_not_allowed),
        )
        .route(
            "/export-user-data",
            post(export_user_data).fallback(method_not_allowed),
        )
        .route(
            "/process-delete",
            post(process_delete).fallback(method_not_allowed),
        )
        .route(
            "/calendar-conflicts",
            post(calendar_conflicts).fallback(method_not_allowed),
        )
        .route(
            "/program_ingest",
            post(program_ingest).fallback(method_not_allowed),
        );

    Router::new()
        .route("/health", get(health_check))
        .nest("/functions/v1", functions)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
