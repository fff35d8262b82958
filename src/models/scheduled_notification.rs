use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Local mirror of a notification handed to the provider for later delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ScheduledNotification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub day_id: Option<Uuid>,
    #[sqlx(try_from = "String")]
    pub notification_type: ReminderKind,
    pub send_at: DateTime<Utc>,
    pub onesignal_notification_id: String,
    #[sqlx(try_from = "String")]
    pub status: ScheduleStatus,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Scheduled,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    WorkoutReminder,
    RestDayReminder,
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Scheduled => "scheduled",
            ScheduleStatus::Cancelled => "cancelled",
        }
    }
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::WorkoutReminder => "workout_reminder",
            ReminderKind::RestDayReminder => "rest_day_reminder",
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for ScheduleStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "scheduled" => Ok(ScheduleStatus::Scheduled),
            "cancelled" => Ok(ScheduleStatus::Cancelled),
            other => Err(format!("unknown schedule status '{}'", other)),
        }
    }
}

impl TryFrom<String> for ReminderKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "workout_reminder" => Ok(ReminderKind::WorkoutReminder),
            "rest_day_reminder" => Ok(ReminderKind::RestDayReminder),
            other => Err(format!("unknown reminder kind '{}'", other)),
        }
    }
}

/// Fields needed to persist a freshly scheduled reminder.
#[derive(Debug, Clone)]
pub struct NewScheduledNotification {
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub day_id: Option<Uuid>,
    pub notification_type: ReminderKind,
    pub send_at: DateTime<Utc>,
    pub onesignal_notification_id: String,
}

/// Body shared by the schedule and cancel endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanReminderRequest {
    pub plan_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledReminderSummary {
    pub day_id: Uuid,
    pub day_label: String,
    pub send_time: String,
    pub notification_id: String,
}

/// What a scheduling run produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleOutcome {
    RemindersDisabled,
    Scheduled(Vec<ScheduledReminderSummary>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationReport {
    pub cancelled_count: usize,
    pub total_scheduled: usize,
}
