use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::CalendarEvent;

#[async_trait]
pub trait CalendarRepository: Send + Sync {
    /// Events of `coach_id` that overlap `[start_at, end_at)`, earliest first.
    async fn find_overlapping(
        &self,
        coach_id: Uuid,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, sqlx::Error>;
}

#[derive(Clone)]
pub struct PgCalendarRepository {
    db: PgPool,
}

impl PgCalendarRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CalendarRepository for PgCalendarRepository {
    async fn find_overlapping(
        &self,
        coach_id: Uuid,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, sqlx::Error> {
        sqlx::query_as::<_, CalendarEvent>(
            r#"
            SELECT id, title, start_at, end_at
            FROM calendar_events
            WHERE coach_id = $1 AND start_at < $3 AND end_at > $2
            ORDER BY start_at
            "#,
        )
        .bind(coach_id)
        .bind(start_at)
        .bind(end_at)
        .fetch_all(&self.db)
        .await
    }
}
