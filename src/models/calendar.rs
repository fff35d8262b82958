use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

pub const MISSING_WINDOW_FIELDS: &str = "Missing required fields: coachId, startAt, endAt";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictCheckRequest {
    #[serde(default, alias = "coach_id")]
    pub coach_id: Option<String>,
    #[serde(default, alias = "start_at")]
    pub start_at: Option<String>,
    #[serde(default, alias = "end_at")]
    pub end_at: Option<String>,
}

/// A validated `[start_at, end_at)` slot on one coach's calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictWindow {
    pub coach_id: Uuid,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

fn timestamp(raw: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| AppError::invalid("startAt and endAt must be RFC 3339 timestamps"))
}

impl TryFrom<ConflictCheckRequest> for ConflictWindow {
    type Error = AppError;

    fn try_from(request: ConflictCheckRequest) -> Result<Self, Self::Error> {
        let present = |field: Option<String>| field.filter(|v| !v.trim().is_empty());

        let (coach_id, start_at, end_at) = match (
            present(request.coach_id),
            present(request.start_at),
            present(request.end_at),
        ) {
            (Some(coach_id), Some(start_at), Some(end_at)) => (coach_id, start_at, end_at),
            _ => return Err(AppError::invalid(MISSING_WINDOW_FIELDS)),
        };

        let coach_id = Uuid::parse_str(coach_id.trim())
            .map_err(|_| AppError::invalid("coachId must be a valid UUID"))?;

        Ok(ConflictWindow {
            coach_id,
            start_at: timestamp(&start_at)?,
            end_at: timestamp(&end_at)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: Uuid,
    pub title: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    pub has_conflict: bool,
    pub conflicts: Vec<CalendarEvent>,
}

impl From<Vec<CalendarEvent>> for ConflictReport {
    fn from(conflicts: Vec<CalendarEvent>) -> Self {
        Self {
            has_conflict: !conflicts.is_empty(),
            conflicts,
        }
    }
}
