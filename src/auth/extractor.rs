use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

use super::jwt::{extract_bearer_token, AuthError};
use crate::api::AppState;
use crate::errors::AppError;

/// The signed-in caller, taken from `Authorization: Bearer <access token>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: Option<String>,
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> Self {
        tracing::debug!("Rejected request: {}", error);
        AppError::Unauthorized
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingAuthHeader)?;

        let token = extract_bearer_token(header)?;
        let claims = state.jwt.verify(token)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthUser {
            user_id,
            email: claims.email,
        })
    }
}
