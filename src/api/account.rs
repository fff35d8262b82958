use axum::{body::Bytes, extract::State, response::Json};
use uuid::Uuid;

use super::routes::AppState;
use crate::auth::AuthUser;
use crate::errors::{AppError, AppResult};
use crate::models::{DataExportLink, DeletionReceipt, DeletionRequest};

pub async fn export_user_data(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataExportLink>> {
    let link = state.account_service.export_user_data(user.user_id).await?;
    Ok(Json(link))
}

/// Admin only. The caller's role is checked before the body is read.
pub async fn process_delete(
    State(state): State<AppState>,
    admin: AuthUser,
    body: Bytes,
) -> AppResult<Json<DeletionReceipt>> {
    state.account_service.require_admin(admin.user_id).await?;

    let request: DeletionRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::invalid(format!("Invalid JSON body: {}", e)))?;
    let user_id = request
        .user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::invalid("Missing userId"))?;
    let user_id = Uuid::parse_str(user_id.trim()).map_err(|_| AppError::invalid("userId must be a valid UUID"))?;

    let receipt = state
        .account_service
        .process_deletion(admin.user_id, user_id)
        .await?;
    Ok(Json(receipt))
}
