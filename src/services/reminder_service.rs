use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rand::seq::SliceRandom;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{
    ActionButton, CancellationReport, NewScheduledNotification, OneSignalPayload, ReminderKind,
    ReminderPreferences, ScheduleOutcome, ScheduledReminderSummary, WorkoutDay,
    DEFAULT_REMINDER_MINUTES_BEFORE,
};
use crate::services::onesignal_client::notification_id;
use crate::services::{PushProvider, ReminderStore, WorkoutPlanRepository};

/// Workouts without a configured time are assumed to start at 08:00.
const DEFAULT_WORKOUT_HOUR: u32 = 8;
const MINUTES_PER_SET: f64 = 3.0;

pub const REST_DAY_MESSAGES: [&str; 4] = [
    "Recovery is where the magic happens! 💤",
    "Rest today, conquer tomorrow! 🌟",
    "Your muscles are rebuilding stronger! 💪",
    "Active recovery or complete rest - both build strength! 🧘",
];

/// Schedules and cancels provider-side workout reminders for a plan.
#[derive(Clone)]
pub struct ReminderService {
    provider: Arc<dyn PushProvider>,
    store: Arc<dyn ReminderStore>,
    plans: Arc<dyn WorkoutPlanRepository>,
}

impl ReminderService {
    pub fn new(
        provider: Arc<dyn PushProvider>,
        store: Arc<dyn ReminderStore>,
        plans: Arc<dyn WorkoutPlanRepository>,
    ) -> Self {
        Self {
            provider,
            store,
            plans,
        }
    }

    pub async fn schedule_for_plan(&self, plan_id: Uuid) -> Result<ScheduleOutcome, AppError> {
        self.schedule_for_plan_at(plan_id, Utc::now()).await
    }

    /// Schedule every upcoming day of the plan relative to `now`.
    ///
    /// A provider failure stops the run; records already written stay.
    pub async fn schedule_for_plan_at(
        &self,
        plan_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<ScheduleOutcome, AppError> {
        let plan = self
            .plans
            .find_plan(plan_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Workout plan {} not found", plan_id)))?;

        let player_id = plan
            .onesignal_player_id
            .clone()
            .ok_or_else(|| AppError::invalid("User has no OneSignal player ID"))?;

        let preferences = self
            .plans
            .find_preferences(plan.user_id)
            .await?
            .unwrap_or_default();

        if !preferences.workout_reminders_enabled {
            info!("Workout reminders disabled for user {}", plan.user_id);
            return Ok(ScheduleOutcome::RemindersDisabled);
        }

        let mut scheduled = Vec::new();
        for day in &plan.days {
            if day.is_rest_day && !preferences.rest_day_reminders_enabled {
                continue;
            }

            let send_time = calculate_send_time(day.date, &preferences);
            if send_time < now {
                continue;
            }

            let (kind, mut payload) = if day.is_rest_day {
                (ReminderKind::RestDayReminder, rest_day_payload(self.provider.app_id(), day))
            } else {
                (ReminderKind::WorkoutReminder, workout_payload(self.provider.app_id(), day))
            };
            payload.include_player_ids = Some(vec![player_id.clone()]);
            payload.send_after = Some(send_time.to_rfc3339());

            let result = self
                .provider
                .create_notification(&payload)
                .await
                .map_err(|e| AppError::upstream("Failed to schedule reminder via OneSignal", e))?;

            let notification_id = notification_id(&result)
                .map_err(|e| AppError::upstream("Failed to schedule reminder via OneSignal", e))?
                .to_string();

            self.store
                .insert(NewScheduledNotification {
                    user_id: plan.user_id,
                    plan_id,
                    day_id: Some(day.id),
                    notification_type: kind,
                    send_at: send_time,
                    onesignal_notification_id: notification_id.clone(),
                })
                .await?;

            scheduled.push(ScheduledReminderSummary {
                day_id: day.id,
                day_label: day.day_label.clone(),
                send_time: send_time.to_rfc3339(),
                notification_id,
            });
        }

        info!("Scheduled {} reminders for plan {}", scheduled.len(), plan_id);
        Ok(ScheduleOutcome::Scheduled(scheduled))
    }

    /// Best-effort: a failed item is logged and left `scheduled`.
    pub async fn cancel_for_plan(&self, plan_id: Uuid) -> Result<CancellationReport, AppError> {
        let scheduled = self.store.find_scheduled_for_plan(plan_id).await?;
        let total_scheduled = scheduled.len();

        let mut cancelled_count = 0;
        for record in scheduled {
            if let Err(e) = self
                .provider
                .cancel_notification(&record.onesignal_notification_id)
                .await
            {
                warn!("Failed to cancel notification {}: {}", record.id, e);
                continue;
            }

            match self.store.mark_cancelled(record.id).await {
                Ok(()) => cancelled_count += 1,
                Err(e) => warn!("Cancelled notification {} but could not update it: {}", record.id, e),
            }
        }

        info!(
            "Cancelled {} of {} reminders for plan {}",
            cancelled_count, total_scheduled, plan_id
        );

        Ok(CancellationReport {
            cancelled_count,
            total_scheduled,
        })
    }
}

/// Fixed `HH:MM` when configured, otherwise the default workout hour minus the lead time.
pub fn calculate_send_time(date: NaiveDate, preferences: &ReminderPreferences) -> DateTime<Utc> {
    if let Some(time) = preferences
        .workout_reminder_time
        .as_deref()
        .and_then(parse_reminder_time)
    {
        return date.and_time(time).and_utc();
    }

    let workout_start = date.and_time(NaiveTime::MIN) + Duration::hours(DEFAULT_WORKOUT_HOUR as i64);
    let lead = preferences.reminder_minutes_before;
    let send_at = Duration::try_minutes(lead).and_then(|d| workout_start.checked_sub_signed(d));

    match send_at {
        Some(send_at) => send_at.and_utc(),
        None => {
            warn!(
                "reminder_minutes_before {} is out of range, using {}",
                lead, DEFAULT_REMINDER_MINUTES_BEFORE
            );
            (workout_start - Duration::minutes(DEFAULT_REMINDER_MINUTES_BEFORE)).and_utc()
        }
    }
}

fn parse_reminder_time(raw: &str) -> Option<NaiveTime> {
    let (hours, minutes) = raw.trim().split_once(':')?;
    NaiveTime::from_hms_opt(hours.parse().ok()?, minutes.get(..2).unwrap_or(minutes).parse().ok()?, 0)
}

/// Muscle groups in first-seen order without duplicates.
pub fn muscle_groups(day: &WorkoutDay) -> Vec<String> {
    let mut groups: Vec<String> = Vec::new();
    for group in day.exercises.iter().filter_map(|e| e.muscle_group.as_ref()) {
        if !groups.contains(group) {
            groups.push(group.clone());
        }
    }
    groups
}

pub fn estimated_duration_minutes(day: &WorkoutDay) -> i64 {
    let total_sets: i64 = day.exercises.iter().map(|e| e.sets.unwrap_or(0) as i64).sum();
    (total_sets as f64 * MINUTES_PER_SET).ceil() as i64
}

pub fn workout_payload(app_id: &str, day: &WorkoutDay) -> OneSignalPayload {
    let exercise_count = day.exercises.len();
    let groups = muscle_groups(day);
    let duration = estimated_duration_minutes(day);

    let mut payload = OneSignalPayload::new(
        app_id,
        format!("Time for {}", day.day_label),
        format!("{} exercises • {} • ~{} min", exercise_count, groups.join(", "), duration),
    );

    let details = json!({
        "day_id": day.id,
        "day_label": day.day_label,
        "scheduled_time": day.date,
        "exercise_count": exercise_count,
        "estimated_duration": duration,
        "muscle_groups": groups,
    });
    payload.data = Some(reminder_data(ReminderKind::WorkoutReminder, &details));
    payload.buttons = Some(vec![
        ActionButton {
            id: "start".to_string(),
            text: "Start Workout".to_string(),
        },
        ActionButton {
            id: "snooze".to_string(),
            text: "Snooze 15min".to_string(),
        },
    ]);
    payload.android_channel_id = Some("workout_reminders".to_string());
    payload.ios_sound = Some("workout_bell.wav".to_string());
    payload
}

pub fn rest_day_payload(app_id: &str, day: &WorkoutDay) -> OneSignalPayload {
    let message = REST_DAY_MESSAGES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(REST_DAY_MESSAGES[0]);

    let mut payload = OneSignalPayload::new(app_id, "Rest Day 💤", message);
    let details = json!({
        "date": day.date,
        "motivational_message": message,
        "is_active_recovery": false,
    });
    payload.data = Some(reminder_data(ReminderKind::RestDayReminder, &details));
    payload.android_channel_id = Some("rest_day_reminders".to_string());
    payload
}

// The app decodes `payload` as a JSON string, not an object
fn reminder_data(kind: ReminderKind, details: &Value) -> Map<String, Value> {
    let mut data = Map::new();
    data.insert("type".to_string(), Value::String(kind.as_str().to_string()));
    data.insert("payload".to_string(), Value::String(details.to_string()));
    data
}
