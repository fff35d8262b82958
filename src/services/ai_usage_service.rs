use chrono::{Datelike, Utc};
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::{AiUsageIncrement, AiUsageRecord};

/// Monthly token accounting per user.
#[derive(Clone)]
pub struct AiUsageService {
    db: PgPool,
}

impl AiUsageService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Add tokens to the current UTC month's row, creating it on first use.
    pub async fn record_usage(&self, increment: AiUsageIncrement) -> Result<AiUsageRecord, AppError> {
        let now = Utc::now();

        let record = sqlx::query_as::<_, AiUsageRecord>(
            r#"
            INSERT INTO ai_usage (user_id, month, year, tokens_used, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, month, year)
            DO UPDATE SET
                tokens_used = ai_usage.tokens_used + EXCLUDED.tokens_used,
                updated_at = EXCLUDED.updated_at
            RETURNING id, user_id, month, year, tokens_used, updated_at
            "#,
        )
        .bind(increment.user_id)
        .bind(now.month() as i32)
        .bind(now.year())
        .bind(increment.tokens_used)
        .bind(now)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(
            "AI usage updated for user {} ({}/{}): +{} tokens, {} total",
            record.user_id,
            record.month,
            record.year,
            increment.tokens_used,
            record.tokens_used
        );

        Ok(record)
    }
}
