use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AiUsageRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub month: i32,
    pub year: i32,
    pub tokens_used: i64,
    pub updated_at: DateTime<Utc>,
}

/// Raw body; `tokens_used` stays untyped so non-numbers get the documented message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAiUsageRequest {
    pub user_id: Option<String>,
    pub tokens_used: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiUsageIncrement {
    pub user_id: Uuid,
    pub tokens_used: i64,
}

/// Largest increment accepted in one call.
pub const MAX_TOKENS_PER_UPDATE: f64 = i32::MAX as f64;

/// Hyphenated, version 1 to 5, RFC 4122 variant.
fn parse_user_id(raw: &str) -> Option<Uuid> {
    if raw.len() != 36 {
        return None;
    }
    let id = Uuid::parse_str(raw).ok()?;
    let known_version = (1..=5).contains(&id.get_version_num());
    (known_version && id.get_variant() == uuid::Variant::RFC4122).then_some(id)
}

impl TryFrom<UpdateAiUsageRequest> for AiUsageIncrement {
    type Error = AppError;

    fn try_from(request: UpdateAiUsageRequest) -> Result<Self, Self::Error> {
        let user_id = request.user_id.filter(|id| !id.is_empty());
        let tokens = request.tokens_used.as_ref().and_then(Value::as_f64);

        let (user_id, tokens) = match (user_id, tokens) {
            (Some(user_id), Some(tokens)) => (user_id, tokens),
            _ => {
                return Err(AppError::invalid(
                    "user_id and tokens_used are required. tokens_used must be a number.",
                ))
            }
        };

        let user_id = parse_user_id(&user_id)
            .ok_or_else(|| AppError::invalid("Invalid user_id format. Must be a valid UUID."))?;

        if tokens < 0.0 {
            return Err(AppError::invalid("tokens_used must be a positive number."));
        }

        if !tokens.is_finite() || tokens > MAX_TOKENS_PER_UPDATE {
            return Err(AppError::invalid(format!(
                "tokens_used must not exceed {}.",
                MAX_TOKENS_PER_UPDATE
            )));
        }

        Ok(AiUsageIncrement {
            user_id,
            tokens_used: tokens.round() as i64,
        })
    }
}
