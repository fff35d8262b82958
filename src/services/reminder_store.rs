use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Mutex;
use uuid::Uuid;

use crate::models::{NewScheduledNotification, ScheduleStatus, ScheduledNotification};

/// Persistence for scheduled-notification records.
#[async_trait]
pub trait ReminderStore: Send + Sync {
    async fn insert(&self, record: NewScheduledNotification) -> Result<ScheduledNotification, sqlx::Error>;

    async fn find_scheduled_for_plan(&self, plan_id: Uuid) -> Result<Vec<ScheduledNotification>, sqlx::Error>;

    async fn mark_cancelled(&self, id: Uuid) -> Result<(), sqlx::Error>;
}

const RECORD_COLUMNS: &str = "id, user_id, plan_id, day_id, notification_type, send_at, \
     onesignal_notification_id, status, cancelled_at, created_at";

#[derive(Clone)]
pub struct PgReminderStore {
    db: PgPool,
}

impl PgReminderStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReminderStore for PgReminderStore {
    async fn insert(&self, record: NewScheduledNotification) -> Result<ScheduledNotification, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO scheduled_notifications (
                user_id, plan_id, day_id, notification_type, send_at,
                onesignal_notification_id, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            RECORD_COLUMNS
        );

        sqlx::query_as::<_, ScheduledNotification>(&query)
            .bind(record.user_id)
            .bind(record.plan_id)
            .bind(record.day_id)
            .bind(record.notification_type.as_str())
            .bind(record.send_at)
            .bind(&record.onesignal_notification_id)
            .bind(ScheduleStatus::Scheduled.as_str())
            .fetch_one(&self.db)
            .await
    }

    async fn find_scheduled_for_plan(&self, plan_id: Uuid) -> Result<Vec<ScheduledNotification>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM scheduled_notifications WHERE plan_id = $1 AND status = $2 ORDER BY send_at",
            RECORD_COLUMNS
        );

        sqlx::query_as::<_, ScheduledNotification>(&query)
            .bind(plan_id)
            .bind(ScheduleStatus::Scheduled.as_str())
            .fetch_all(&self.db)
            .await
    }

    async fn mark_cancelled(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE scheduled_notifications SET status = $2, cancelled_at = $3 WHERE id = $1")
            .bind(id)
            .bind(ScheduleStatus::Cancelled.as_str())
            .bind(Utc::now())
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

/// Process-local store backed by a `Vec`.
#[derive(Default)]
pub struct InMemoryReminderStore {
    records: Mutex<Vec<ScheduledNotification>>,
}

impl InMemoryReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<ScheduledNotification>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    pub fn snapshot(&self) -> Vec<ScheduledNotification> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    fn poisoned() -> sqlx::Error {
        sqlx::Error::Protocol("in-memory reminder store lock poisoned".to_string())
    }
}

#[async_trait]
impl ReminderStore for InMemoryReminderStore {
    async fn insert(&self, record: NewScheduledNotification) -> Result<ScheduledNotification, sqlx::Error> {
        let stored = ScheduledNotification {
            id: Uuid::new_v4(),
            user_id: record.user_id,
            plan_id: record.plan_id,
            day_id: record.day_id,
            notification_type: record.notification_type,
            send_at: record.send_at,
            onesignal_notification_id: record.onesignal_notification_id,
            status: ScheduleStatus::Scheduled,
            cancelled_at: None,
            created_at: Utc::now(),
        };

        self.records
            .lock()
            .map_err(|_| Self::poisoned())?
            .push(stored.clone());
        Ok(stored)
    }

    async fn find_scheduled_for_plan(&self, plan_id: Uuid) -> Result<Vec<ScheduledNotification>, sqlx::Error> {
        let records = self.records.lock().map_err(|_| Self::poisoned())?;
        let mut found: Vec<_> = records
            .iter()
            .filter(|r| r.plan_id == plan_id && r.status == ScheduleStatus::Scheduled)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.send_at);
        Ok(found)
    }

    async fn mark_cancelled(&self, id: Uuid) -> Result<(), sqlx::Error> {
        let mut records = self.records.lock().map_err(|_| Self::poisoned())?;
        match records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.status = ScheduleStatus::Cancelled;
                record.cancelled_at = Some(Utc::now());
                Ok(())
            }
            None => Err(sqlx::Error::RowNotFound),
        }
    }
}
