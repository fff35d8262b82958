use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The slice of a workout plan that reminder scheduling needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub onesignal_player_id: Option<String>,
    pub days: Vec<WorkoutDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDay {
    pub id: Uuid,
    pub day_label: String,
    pub date: NaiveDate,
    pub is_rest_day: bool,
    pub exercises: Vec<ExerciseSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ExerciseSummary {
    pub name: String,
    pub muscle_group: Option<String>,
    pub sets: Option<i32>,
}

pub const DEFAULT_REMINDER_MINUTES_BEFORE: i64 = 30;

/// Reminder settings stored as JSON in `notification_preferences.preferences`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderPreferences {
    #[serde(default = "default_true")]
    pub workout_reminders_enabled: bool,
    /// Fixed `HH:MM` send time; overrides `reminder_minutes_before`.
    #[serde(default)]
    pub workout_reminder_time: Option<String>,
    #[serde(default = "default_minutes_before")]
    pub reminder_minutes_before: i64,
    #[serde(default = "default_true")]
    pub rest_day_reminders_enabled: bool,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_true() -> bool {
    true
}

fn default_minutes_before() -> i64 {
    DEFAULT_REMINDER_MINUTES_BEFORE
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for ReminderPreferences {
    fn default() -> Self {
        Self {
            workout_reminders_enabled: true,
            workout_reminder_time: None,
            reminder_minutes_before: default_minutes_before(),
            rest_day_reminders_enabled: true,
            timezone: default_timezone(),
        }
    }
}
