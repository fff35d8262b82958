use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use coach_ops::errors::AppError;
use coach_ops::models::*;
use coach_ops::services::*;
use crate::common::{date, init_test_logging, scheduled_record, PlanBuilder, RecordingProvider};

#[cfg(test)]
mod reminder_service_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Harness {
        provider: Arc<RecordingProvider>,
        store: Arc<InMemoryReminderStore>,
        service: ReminderService,
    }

    fn harness(provider: RecordingProvider, plans: InMemoryWorkoutPlanRepository) -> Harness {
        let provider = Arc::new(provider);
        let store = Arc::new(InMemoryReminderStore::new());
        let service = ReminderService::new(provider.clone(), store.clone(), Arc::new(plans));
        Harness {
            provider,
            store,
            service,
        }
    }

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 10, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_schedules_upcoming_days_and_skips_past_ones() {
        init_test_logging();
        let plan = PlanBuilder::plan(vec![
            PlanBuilder::workout_day("Push Day", date(2030, 1, 9)),
            PlanBuilder::workout_day("Pull Day", date(2030, 1, 11)),
            PlanBuilder::rest_day(date(2030, 1, 12)),
        ]);
        let plan_id = plan.id;
        let h = harness(RecordingProvider::new(), InMemoryWorkoutPlanRepository::new().with_plan(plan));

        let outcome = h.service.schedule_for_plan_at(plan_id, now()).await.unwrap();

        let scheduled = match outcome {
            ScheduleOutcome::Scheduled(scheduled) => scheduled,
            other => panic!("unexpected outcome {:?}", other),
        };
        assert_eq!(scheduled.len(), 2);
        assert_eq!(scheduled[0].day_label, "Pull Day");
        assert_eq!(scheduled[0].send_time, "2030-01-11T07:30:00+00:00");
        assert_eq!(scheduled[0].notification_id, "notif-1");
        assert_eq!(scheduled[1].day_label, "Rest");

        let records = h.store.snapshot();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.status == ScheduleStatus::Scheduled && r.plan_id == plan_id));
        assert_eq!(records[1].notification_type, ReminderKind::RestDayReminder);
    }

    #[tokio::test]
    async fn test_workout_payload_content() {
        let plan = PlanBuilder::plan(vec![PlanBuilder::workout_day("Push Day", date(2030, 1, 11))]);
        let plan_id = plan.id;
        let h = harness(RecordingProvider::new(), InMemoryWorkoutPlanRepository::new().with_plan(plan));

        h.service.schedule_for_plan_at(plan_id, now()).await.unwrap();

        let created = h.provider.created();
        assert_eq!(created.len(), 1);
        let payload = &created[0];
        assert_eq!(payload.headings.en, "Time for Push Day");
        assert_eq!(payload.contents.en, "3 exercises • Chest, Triceps • ~30 min");
        assert_eq!(payload.include_player_ids, Some(vec!["player-123".to_string()]));
        assert_eq!(payload.send_after.as_deref(), Some("2030-01-11T07:30:00+00:00"));
        assert_eq!(payload.android_channel_id.as_deref(), Some("workout_reminders"));
        assert_eq!(payload.ios_sound.as_deref(), Some("workout_bell.wav"));

        let data = payload.data.as_ref().unwrap();
        assert_eq!(data["type"], Value::from("workout_reminder"));
        let details: Value = serde_json::from_str(data["payload"].as_str().unwrap()).unwrap();
        assert_eq!(details["estimated_duration"], Value::from(30));

        let buttons: Vec<&str> = payload.buttons.as_ref().unwrap().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(buttons, vec!["start", "snooze"]);
    }

    #[tokio::test]
    async fn test_rest_days_skipped_when_disabled() {
        let plan = PlanBuilder::plan(vec![
            PlanBuilder::rest_day(date(2030, 1, 11)),
            PlanBuilder::workout_day("Legs", date(2030, 1, 12)),
        ]);
        let plan_id = plan.id;
        let preferences = ReminderPreferences {
            rest_day_reminders_enabled: false,
            ..ReminderPreferences::default()
        };
        let plans = InMemoryWorkoutPlanRepository::new()
            .with_preferences(plan.user_id, preferences)
            .with_plan(plan);
        let h = harness(RecordingProvider::new(), plans);

        h.service.schedule_for_plan_at(plan_id, now()).await.unwrap();

        let created = h.provider.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].headings.en, "Time for Legs");
    }

    #[tokio::test]
    async fn test_rest_day_message_comes_from_fixed_list() {
        let plan = PlanBuilder::plan(vec![PlanBuilder::rest_day(date(2030, 1, 11))]);
        let plan_id = plan.id;
        let h = harness(RecordingProvider::new(), InMemoryWorkoutPlanRepository::new().with_plan(plan));

        h.service.schedule_for_plan_at(plan_id, now()).await.unwrap();

        let payload = &h.provider.created()[0];
        assert_eq!(payload.headings.en, "Rest Day 💤");
        assert!(coach_ops::services::reminder_service::REST_DAY_MESSAGES.contains(&payload.contents.en.as_str()));
        assert_eq!(payload.android_channel_id.as_deref(), Some("rest_day_reminders"));
    }

    #[tokio::test]
    async fn test_fixed_reminder_time_overrides_lead_minutes() {
        let plan = PlanBuilder::plan(vec![PlanBuilder::workout_day("Push", date(2030, 1, 11))]);
        let plan_id = plan.id;
        let preferences = ReminderPreferences {
            workout_reminder_time: Some("18:15".to_string()),
            ..ReminderPreferences::default()
        };
        let plans = InMemoryWorkoutPlanRepository::new()
            .with_preferences(plan.user_id, preferences)
            .with_plan(plan);
        let h = harness(RecordingProvider::new(), plans);

        h.service.schedule_for_plan_at(plan_id, now()).await.unwrap();

        assert_eq!(
            h.provider.created()[0].send_after.as_deref(),
            Some("2030-01-11T18:15:00+00:00")
        );
    }

    #[tokio::test]
    async fn test_disabled_reminders_schedule_nothing() {
        let plan = PlanBuilder::plan(vec![PlanBuilder::workout_day("Push", date(2030, 1, 11))]);
        let plan_id = plan.id;
        let preferences = ReminderPreferences {
            workout_reminders_enabled: false,
            ..ReminderPreferences::default()
        };
        let plans = InMemoryWorkoutPlanRepository::new()
            .with_preferences(plan.user_id, preferences)
            .with_plan(plan);
        let h = harness(RecordingProvider::new(), plans);

        let outcome = h.service.schedule_for_plan_at(plan_id, now()).await.unwrap();

        assert_eq!(outcome, ScheduleOutcome::RemindersDisabled);
        assert!(h.provider.created().is_empty());
        assert!(h.store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_missing_player_id_is_invalid_request() {
        let mut plan = PlanBuilder::plan(vec![PlanBuilder::workout_day("Push", date(2030, 1, 11))]);
        plan.onesignal_player_id = None;
        let plan_id = plan.id;
        let h = harness(RecordingProvider::new(), InMemoryWorkoutPlanRepository::new().with_plan(plan));

        let result = h.service.schedule_for_plan_at(plan_id, now()).await;

        assert_matches!(result, Err(AppError::InvalidRequest(ref m)) if m == "User has no OneSignal player ID");
    }

    #[tokio::test]
    async fn test_unknown_plan_is_not_found() {
        let h = harness(RecordingProvider::new(), InMemoryWorkoutPlanRepository::new());
        let result = h.service.schedule_for_plan_at(Uuid::new_v4(), now()).await;
        assert_matches!(result, Err(AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_provider_failure_stops_run_and_keeps_earlier_records() {
        let plan = PlanBuilder::plan(vec![
            PlanBuilder::workout_day("Day 1", date(2030, 1, 11)),
            PlanBuilder::workout_day("Day 2", date(2030, 1, 12)),
            PlanBuilder::workout_day("Day 3", date(2030, 1, 13)),
        ]);
        let plan_id = plan.id;
        let h = harness(
            RecordingProvider::failing_create_after(1),
            InMemoryWorkoutPlanRepository::new().with_plan(plan),
        );

        let result = h.service.schedule_for_plan_at(plan_id, now()).await;

        assert_matches!(
            result,
            Err(AppError::Upstream { ref context, ref details })
                if context == "Failed to schedule reminder via OneSignal" && details.contains("quota exceeded")
        );
        assert_eq!(h.store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_is_best_effort_when_one_delete_fails() {
        init_test_logging();
        let plan_id = Uuid::new_v4();
        let records = vec![
            scheduled_record(plan_id, "n-1"),
            scheduled_record(plan_id, "n-2"),
            scheduled_record(plan_id, "n-3"),
            scheduled_record(plan_id, "n-4"),
        ];
        let provider = Arc::new(RecordingProvider::rejecting_cancel_of(&["n-2"]));
        let store = Arc::new(InMemoryReminderStore::with_records(records));
        let service = ReminderService::new(
            provider.clone(),
            store.clone(),
            Arc::new(InMemoryWorkoutPlanRepository::new()),
        );

        let report = service.cancel_for_plan(plan_id).await.unwrap();

        assert_eq!(
            report,
            CancellationReport {
                cancelled_count: 3,
                total_scheduled: 4
            }
        );

        let snapshot = store.snapshot();
        let cancelled = snapshot.iter().filter(|r| r.status == ScheduleStatus::Cancelled).count();
        let left: Vec<_> = snapshot
            .iter()
            .filter(|r| r.status == ScheduleStatus::Scheduled)
            .map(|r| r.onesignal_notification_id.as_str())
            .collect();
        assert_eq!(cancelled, 3);
        assert_eq!(left, vec!["n-2"]);
        assert!(snapshot
            .iter()
            .filter(|r| r.status == ScheduleStatus::Cancelled)
            .all(|r| r.cancelled_at.is_some()));
        assert_eq!(provider.cancelled().len(), 3);
    }

    #[tokio::test]
    async fn test_cancel_ignores_other_plans_and_already_cancelled_records() {
        let plan_id = Uuid::new_v4();
        let mut already = scheduled_record(plan_id, "old");
        already.status = ScheduleStatus::Cancelled;
        let records = vec![
            already,
            scheduled_record(Uuid::new_v4(), "other-plan"),
            scheduled_record(plan_id, "mine"),
        ];
        let provider = Arc::new(RecordingProvider::new());
        let store = Arc::new(InMemoryReminderStore::with_records(records));
        let service = ReminderService::new(
            provider.clone(),
            store,
            Arc::new(InMemoryWorkoutPlanRepository::new()),
        );

        let report = service.cancel_for_plan(plan_id).await.unwrap();

        assert_eq!(report.total_scheduled, 1);
        assert_eq!(provider.cancelled(), vec!["mine".to_string()]);
    }

    #[tokio::test]
    async fn test_ack_without_id_is_an_upstream_error_and_nothing_is_stored() {
        let plan = PlanBuilder::plan(vec![PlanBuilder::workout_day("Push", date(2030, 1, 11))]);
        let plan_id = plan.id;
        let h = harness(
            RecordingProvider::acking_without_ids(),
            InMemoryWorkoutPlanRepository::new().with_plan(plan),
        );

        let result = h.service.schedule_for_plan_at(plan_id, now()).await;

        assert_matches!(result, Err(AppError::Upstream { ref context, ref details }) => {
            assert_eq!(context, "Failed to schedule reminder via OneSignal");
            assert!(details.contains("no notification id"));
        });
        assert_eq!(h.provider.created().len(), 1);
        assert!(h.store.snapshot().is_empty());
    }
}
