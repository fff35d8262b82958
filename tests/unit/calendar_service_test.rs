use std::sync::Arc;
use uuid::Uuid;

use coach_ops::models::ConflictWindow;
use coach_ops::services::CalendarService;
use crate::common::{event, StaticCalendar};

#[cfg(test)]
mod calendar_service_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn window(coach_id: Uuid, start_at: &str, end_at: &str) -> ConflictWindow {
        let slot = event("slot", start_at, end_at);
        ConflictWindow {
            coach_id,
            start_at: slot.start_at,
            end_at: slot.end_at,
        }
    }

    #[tokio::test]
    async fn test_overlapping_events_of_the_same_coach_conflict() {
        let coach = Uuid::new_v4();
        let other_coach = Uuid::new_v4();
        let service = CalendarService::new(Arc::new(StaticCalendar::new(vec![
            (coach, event("Check-in", "2030-01-01T10:30:00Z", "2030-01-01T11:30:00Z")),
            (coach, event("Morning PT", "2030-01-01T08:00:00Z", "2030-01-01T09:00:00Z")),
            (other_coach, event("Not mine", "2030-01-01T10:00:00Z", "2030-01-01T11:00:00Z")),
        ])));

        let report = service
            .check_conflicts(window(coach, "2030-01-01T10:00:00Z", "2030-01-01T11:00:00Z"))
            .await
            .unwrap();

        assert!(report.has_conflict);
        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].title.as_deref(), Some("Check-in"));
    }

    #[tokio::test]
    async fn test_back_to_back_slots_do_not_conflict() {
        let coach = Uuid::new_v4();
        let service = CalendarService::new(Arc::new(StaticCalendar::new(vec![(
            coach,
            event("Session", "2030-01-01T09:00:00Z", "2030-01-01T10:00:00Z"),
        )])));

        let report = service
            .check_conflicts(window(coach, "2030-01-01T10:00:00Z", "2030-01-01T11:00:00Z"))
            .await
            .unwrap();

        assert!(!report.has_conflict);
        assert!(report.conflicts.is_empty());
    }
}
