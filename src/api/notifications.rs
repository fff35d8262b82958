use axum::{extract::State, response::Json};
use axum_extra::extract::WithRejection;

use super::routes::AppState;
use crate::errors::{AppError, AppResult};
use crate::models::{DispatchResponse, SendNotificationRequest};

/// Validate the dispatch request and forward it to OneSignal.
pub async fn send_notification(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<SendNotificationRequest>, AppError>,
) -> AppResult<Json<DispatchResponse>> {
    let response = state.notification_service.send(request).await?;
    Ok(Json(response))
}
