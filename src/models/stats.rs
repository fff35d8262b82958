use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct RoleCount {
    pub role: String,
    pub user_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CoachClientLink {
    pub coach_id: Uuid,
    pub coach_name: Option<String>,
    pub client_id: Uuid,
    pub client_name: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct AiUsageSummary {
    pub user_id: Uuid,
    pub user_name: Option<String>,
    pub month: i32,
    pub year: i32,
    pub tokens_used: i64,
    pub updated_at: DateTime<Utc>,
}
