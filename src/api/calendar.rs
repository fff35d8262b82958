use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use axum_extra::extract::WithRejection;
use serde_json::json;

use super::routes::AppState;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::{ConflictCheckRequest, ConflictWindow};

/// Server-side failures still carry an empty conflict list so callers can
/// read the same shape either way.
pub async fn calendar_conflicts(
    State(state): State<AppState>,
    _user: AuthUser,
    WithRejection(Json(request), _): WithRejection<Json<ConflictCheckRequest>, AppError>,
) -> Response {
    let result = match ConflictWindow::try_from(request) {
        Ok(window) => state.calendar_service.check_conflicts(window).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(report) => Json(report).into_response(),
        Err(e) if e.status_code() == StatusCode::INTERNAL_SERVER_ERROR => {
            tracing::error!("Conflict check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string(), "hasConflict": false, "conflicts": [] })),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}
