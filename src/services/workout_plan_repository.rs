use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::models::{ExerciseSummary, ReminderPreferences, WorkoutDay, WorkoutPlan};

/// Read access to plans and reminder preferences owned by the app schema.
#[async_trait]
pub trait WorkoutPlanRepository: Send + Sync {
    async fn find_plan(&self, plan_id: Uuid) -> Result<Option<WorkoutPlan>, sqlx::Error>;

    async fn find_preferences(&self, user_id: Uuid) -> Result<Option<ReminderPreferences>, sqlx::Error>;
}

#[derive(Debug, FromRow)]
struct PlanOwnerRow {
    id: Uuid,
    user_id: Uuid,
    onesignal_player_id: Option<String>,
}

#[derive(Debug, FromRow)]
struct DayRow {
    id: Uuid,
    day_label: String,
    date: NaiveDate,
    is_rest_day: bool,
}

#[derive(Debug, FromRow)]
struct ExerciseRow {
    day_id: Uuid,
    name: String,
    muscle_group: Option<String>,
    sets: Option<i32>,
}

#[derive(Clone)]
pub struct PgWorkoutPlanRepository {
    db: PgPool,
}

impl PgWorkoutPlanRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl WorkoutPlanRepository for PgWorkoutPlanRepository {
    async fn find_plan(&self, plan_id: Uuid) -> Result<Option<WorkoutPlan>, sqlx::Error> {
        let owner = sqlx::query_as::<_, PlanOwnerRow>(
            r#"
            SELECT wp.id, wp.user_id, p.onesignal_player_id
            FROM workout_plans wp
            JOIN profiles p ON p.id = wp.user_id
            WHERE wp.id = $1
            "#,
        )
        .bind(plan_id)
        .fetch_optional(&self.db)
        .await?;

        let Some(owner) = owner else {
            return Ok(None);
        };

        let day_rows = sqlx::query_as::<_, DayRow>(
            r#"
            SELECT wd.id, wd.day_label, wd.date::date AS date,
                   COALESCE(wd.is_rest_day, false) AS is_rest_day
            FROM workout_days wd
            JOIN workout_weeks ww ON ww.id = wd.week_id
            WHERE ww.plan_id = $1
            ORDER BY wd.date
            "#,
        )
        .bind(plan_id)
        .fetch_all(&self.db)
        .await?;

        let day_ids: Vec<Uuid> = day_rows.iter().map(|d| d.id).collect();
        let exercise_rows = sqlx::query_as::<_, ExerciseRow>(
            r#"
            SELECT day_id, name, muscle_group, sets
            FROM exercises
            WHERE day_id = ANY($1)
            ORDER BY day_id
            "#,
        )
        .bind(&day_ids)
        .fetch_all(&self.db)
        .await?;

        let mut exercises_by_day: HashMap<Uuid, Vec<ExerciseSummary>> = HashMap::new();
        for row in exercise_rows {
            exercises_by_day.entry(row.day_id).or_default().push(ExerciseSummary {
                name: row.name,
                muscle_group: row.muscle_group,
                sets: row.sets,
            });
        }

        let days = day_rows
            .into_iter()
            .map(|day| WorkoutDay {
                exercises: exercises_by_day.remove(&day.id).unwrap_or_default(),
                id: day.id,
                day_label: day.day_label,
                date: day.date,
                is_rest_day: day.is_rest_day,
            })
            .collect();

        Ok(Some(WorkoutPlan {
            id: owner.id,
            user_id: owner.user_id,
            onesignal_player_id: owner.onesignal_player_id.filter(|id| !id.is_empty()),
            days,
        }))
    }

    async fn find_preferences(&self, user_id: Uuid) -> Result<Option<ReminderPreferences>, sqlx::Error> {
        let stored: Option<(Option<Value>,)> =
            sqlx::query_as("SELECT preferences FROM notification_preferences WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.db)
                .await?;

        let Some((Some(raw),)) = stored else {
            return Ok(None);
        };

        match serde_json::from_value(raw) {
            Ok(preferences) => Ok(Some(preferences)),
            Err(e) => {
                tracing::warn!("Unreadable reminder preferences for user {}: {}", user_id, e);
                Ok(None)
            }
        }
    }
}

/// Fixed plans and preferences held in memory.
#[derive(Default)]
pub struct InMemoryWorkoutPlanRepository {
    plans: Mutex<HashMap<Uuid, WorkoutPlan>>,
    preferences: Mutex<HashMap<Uuid, ReminderPreferences>>,
}

impl InMemoryWorkoutPlanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plan(self, plan: WorkoutPlan) -> Self {
        if let Ok(mut plans) = self.plans.lock() {
            plans.insert(plan.id, plan);
        }
        self
    }

    pub fn with_preferences(self, user_id: Uuid, preferences: ReminderPreferences) -> Self {
        if let Ok(mut stored) = self.preferences.lock() {
            stored.insert(user_id, preferences);
        }
        self
    }
}

#[async_trait]
impl WorkoutPlanRepository for InMemoryWorkoutPlanRepository {
    async fn find_plan(&self, plan_id: Uuid) -> Result<Option<WorkoutPlan>, sqlx::Error> {
        let plans = self
            .plans
            .lock()
            .map_err(|_| sqlx::Error::Protocol("plan repository lock poisoned".to_string()))?;
        Ok(plans.get(&plan_id).cloned())
    }

    async fn find_preferences(&self, user_id: Uuid) -> Result<Option<ReminderPreferences>, sqlx::Error> {
        let preferences = self
            .preferences
            .lock()
            .map_err(|_| sqlx::Error::Protocol("plan repository lock poisoned".to_string()))?;
        Ok(preferences.get(&user_id).cloned())
    }
}
