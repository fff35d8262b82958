use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
};
use axum_extra::extract::WithRejection;
use serde_json::json;
use uuid::Uuid;

use super::routes::AppState;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::ProgramIngestRequest;

fn job_id(request: ProgramIngestRequest) -> Result<Uuid, AppError> {
    let raw = request
        .job_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::invalid("jobId is required"))?;
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::invalid("jobId must be a valid UUID"))
}

/// Every answer uses the `{success, ...}` envelope, errors included.
pub async fn program_ingest(
    State(state): State<AppState>,
    _user: AuthUser,
    WithRejection(Json(request), _): WithRejection<Json<ProgramIngestRequest>, AppError>,
) -> Response {
    let result = match job_id(request) {
        Ok(job_id) => state.ingest_service.process(job_id).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => Json(json!({
            "success": true,
            "message": "Program parsed successfully",
        }))
        .into_response(),
        Err(e) => {
            if e.status_code().is_server_error() {
                tracing::error!("Program ingest failed: {}", e);
            }
            (
                e.status_code(),
                Json(json!({ "success": false, "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
