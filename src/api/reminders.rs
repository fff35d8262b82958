use axum::{extract::State, response::Json};
use axum_extra::extract::WithRejection;
use serde_json::{json, Value};
use uuid::Uuid;

use super::routes::AppState;
use crate::errors::{AppError, AppResult};
use crate::models::{PlanReminderRequest, ScheduleOutcome};

fn plan_id(request: &PlanReminderRequest) -> AppResult<Uuid> {
    request
        .plan_id
        .as_deref()
        .and_then(|id| Uuid::parse_str(id).ok())
        .ok_or_else(|| AppError::invalid("plan_id is required"))
}

pub async fn schedule_workout_reminders(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<PlanReminderRequest>, AppError>,
) -> AppResult<Json<Value>> {
    let plan_id = plan_id(&request)?;

    let body = match state.reminder_service.schedule_for_plan(plan_id).await? {
        ScheduleOutcome::RemindersDisabled => json!({
            "message": "Workout reminders disabled for user"
        }),
        ScheduleOutcome::Scheduled(notifications) => json!({
            "success": true,
            "scheduled_count": notifications.len(),
            "notifications": notifications,
        }),
    };

    Ok(Json(body))
}

pub async fn cancel_workout_reminders(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<PlanReminderRequest>, AppError>,
) -> AppResult<Json<Value>> {
    let plan_id = plan_id(&request)?;
    let report = state.reminder_service.cancel_for_plan(plan_id).await?;

    if report.total_scheduled == 0 {
        return Ok(Json(json!({
            "success": true,
            "message": "No scheduled notifications found for this plan",
            "cancelled_count": 0,
        })));
    }

    Ok(Json(json!({
        "success": true,
        "cancelled_count": report.cancelled_count,
        "total_scheduled": report.total_scheduled,
    })))
}
