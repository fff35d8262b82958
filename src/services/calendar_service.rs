use std::sync::Arc;
use tracing::debug;

use crate::errors::AppError;
use crate::models::{ConflictReport, ConflictWindow};
use crate::services::CalendarRepository;

/// Double-booking check for coach calendars.
#[derive(Clone)]
pub struct CalendarService {
    events: Arc<dyn CalendarRepository>,
}

impl CalendarService {
    pub fn new(events: Arc<dyn CalendarRepository>) -> Self {
        Self { events }
    }

    /// Two slots conflict when each starts before the other ends, so
    /// back-to-back bookings do not.
    pub async fn check_conflicts(&self, window: ConflictWindow) -> Result<ConflictReport, AppError> {
        let conflicts = self
            .events
            .find_overlapping(window.coach_id, window.start_at, window.end_at)
            .await?;

        debug!(
            "{} conflicting events for coach {} between {} and {}",
            conflicts.len(),
            window.coach_id,
            window.start_at,
            window.end_at
        );
        Ok(ConflictReport::from(conflicts))
    }
}
