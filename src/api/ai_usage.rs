use axum::{extract::State, response::Json};
use axum_extra::extract::WithRejection;
use serde_json::{json, Value};

use super::routes::AppState;
use crate::errors::{AppError, AppResult};
use crate::models::{AiUsageIncrement, UpdateAiUsageRequest};

pub async fn update_ai_usage(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateAiUsageRequest>, AppError>,
) -> AppResult<Json<Value>> {
    let increment = AiUsageIncrement::try_from(request)?;
    let record = state.ai_usage_service.record_usage(increment).await?;

    Ok(Json(json!({
        "success": true,
        "message": "AI usage updated successfully",
        "data": record,
    })))
}
