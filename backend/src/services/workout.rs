//! Workout plans, lift logging and daily progress

use crate::error::ApiError;
use crate::repositories::{
    ExerciseLogRecord, ExerciseLogRepository, ExerciseRecord, ExerciseRepository,
    PlanExerciseRecord, PlanSlot, UserRecord, UserRepository, WorkoutPlanRecord,
    WorkoutPlanRepository,
};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use fittrack_shared::types::{
    ExerciseLogResponse, ExerciseResponse, GeneratedWorkoutPlan, LogExerciseRequest,
    PlannedExercise, TodayStatsResponse, WorkoutDay, WorkoutPlanResponse, WorkoutPlanSummary,
};
use fittrack_shared::validation::validate_lift_weight;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

/// Default and maximum page size for recent logs
pub const DEFAULT_RECENT_LOGS: i64 = 20;
pub const MAX_RECENT_LOGS: i64 = 100;

// ============================================================================
// Conversions
// ============================================================================

impl From<PlanExerciseRecord> for PlannedExercise {
    fn from(r: PlanExerciseRecord) -> Self {
        PlannedExercise {
            exercise_id: r.exercise_id,
            name: r.name,
            description: r.description,
            sets: r.sets,
            reps: r.reps,
            day_number: r.day_number,
            position: r.position,
        }
    }
}

impl From<ExerciseLogRecord> for ExerciseLogResponse {
    fn from(r: ExerciseLogRecord) -> Self {
        ExerciseLogResponse {
            weight: r.weight(),
            id: r.id,
            exercise_id: r.exercise_id,
            exercise_name: r.exercise_name,
            sets: r.sets,
            reps: r.reps,
            logged_at: r.logged_at,
        }
    }
}

impl From<ExerciseRecord> for ExerciseResponse {
    fn from(r: ExerciseRecord) -> Self {
        ExerciseResponse {
            id: r.id,
            name: r.name,
            description: r.description,
            sets: r.sets,
            reps: r.reps,
        }
    }
}

impl From<WorkoutPlanRecord> for WorkoutPlanSummary {
    fn from(r: WorkoutPlanRecord) -> Self {
        WorkoutPlanSummary {
            id: r.id,
            name: r.name,
            description: r.description,
            number_of_days: r.number_of_days,
        }
    }
}

/// Plan day for a calendar date: ISO weekday, Monday = 1 through Sunday = 7
pub fn day_number_for(date: NaiveDate) -> i32 {
    date.weekday().number_from_monday() as i32
}

/// Start and end of the UTC day containing `date`
fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

/// Group exercises ordered by (day, position) into days
fn group_days(number_of_days: i32, exercises: Vec<PlanExerciseRecord>) -> Vec<WorkoutDay> {
    let mut days: Vec<WorkoutDay> = (1..=number_of_days)
        .map(|day_number| WorkoutDay {
            day_number,
            exercises: Vec::new(),
        })
        .collect();

    for exercise in exercises {
        match days.iter_mut().find(|d| d.day_number == exercise.day_number) {
            Some(day) => day.exercises.push(exercise.into()),
            None => days.push(WorkoutDay {
                day_number: exercise.day_number,
                exercises: vec![exercise.into()],
            }),
        }
    }

    days.sort_by_key(|d| d.day_number);
    days
}

fn validate_generated_plan(plan: &GeneratedWorkoutPlan) -> Result<(), ApiError> {
    if plan.name.trim().is_empty() {
        return Err(ApiError::InvalidField {
            field: "name".to_string(),
            message: "Plan name is required".to_string(),
        });
    }
    if !(1..=7).contains(&plan.num_of_days) {
        return Err(ApiError::InvalidField {
            field: "num_of_days".to_string(),
            message: "Plans span 1-7 days".to_string(),
        });
    }
    for day in &plan.days {
        if !(1..=7).contains(&day.day_num) {
            return Err(ApiError::InvalidField {
                field: "day_num".to_string(),
                message: format!("Day {} is outside 1-7", day.day_num),
            });
        }
        if day.exercises.iter().any(|e| e.exercise.name.trim().is_empty()) {
            return Err(ApiError::InvalidField {
                field: "exercise.name".to_string(),
                message: "Every exercise needs a name".to_string(),
            });
        }
    }
    Ok(())
}

pub struct WorkoutService;

impl WorkoutService {
    async fn load_user(pool: &PgPool, user_id: Uuid) -> Result<UserRecord, ApiError> {
        UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    /// Full plan with exercises grouped by day
    pub async fn plan_details(pool: &PgPool, plan_id: Uuid) -> Result<WorkoutPlanResponse, ApiError> {
        let plan = WorkoutPlanRepository::find_by_id(pool, plan_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Workout plan not found".to_string()))?;
        let exercises = WorkoutPlanRepository::exercises(pool, plan_id)
            .await
            .map_err(ApiError::Internal)?;

        Ok(WorkoutPlanResponse {
            days: group_days(plan.number_of_days, exercises),
            id: plan.id,
            name: plan.name,
            description: plan.description,
            number_of_days: plan.number_of_days,
        })
    }

    /// The user's assigned plan
    pub async fn assigned_plan(pool: &PgPool, user_id: Uuid) -> Result<WorkoutPlanResponse, ApiError> {
        let user = Self::load_user(pool, user_id).await?;
        let plan_id = user
            .workout_plan_id
            .ok_or_else(|| ApiError::NotFound("No workout plan assigned".to_string()))?;
        Self::plan_details(pool, plan_id).await
    }

    /// Plans whose day count equals the user's weekly training days
    pub async fn available_plans(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<WorkoutPlanSummary>, ApiError> {
        let user = Self::load_user(pool, user_id).await?;
        let days = user.number_of_training_days.ok_or_else(|| ApiError::InvalidField {
            field: "number_of_training_days".to_string(),
            message: "Set your training days per week first".to_string(),
        })?;

        let plans = WorkoutPlanRepository::list_by_days(pool, days)
            .await
            .map_err(ApiError::Internal)?;
        Ok(plans.into_iter().map(Into::into).collect())
    }

    pub async fn select_plan(
        pool: &PgPool,
        user_id: Uuid,
        plan_id: Uuid,
    ) -> Result<WorkoutPlanResponse, ApiError> {
        let plan = Self::plan_details(pool, plan_id).await?;
        UserRepository::set_workout_plan(pool, user_id, plan_id)
            .await
            .map_err(ApiError::Internal)?;
        info!(user_id = %user_id, plan_id = %plan_id, "Workout plan selected");
        Ok(plan)
    }

    /// Persist a generated plan with its exercises and assign it, all in
    /// one transaction.
    pub async fn save_generated(
        pool: &PgPool,
        user_id: Uuid,
        plan: GeneratedWorkoutPlan,
    ) -> Result<WorkoutPlanResponse, ApiError> {
        validate_generated_plan(&plan)?;

        let mut tx = pool.begin().await?;

        let record = WorkoutPlanRepository::create(
            &mut *tx,
            plan.name.trim(),
            plan.description.as_deref(),
            plan.num_of_days,
        )
        .await
        .map_err(ApiError::Internal)?;

        for day in &plan.days {
            for (index, item) in day.exercises.iter().enumerate() {
                let exercise = ExerciseRepository::create(
                    &mut *tx,
                    item.exercise.name.trim(),
                    item.exercise.description.as_deref(),
                    Some(item.sets).filter(|s| *s > 0),
                    Some(item.reps).filter(|r| *r > 0),
                )
                .await
                .map_err(ApiError::Internal)?;

                let slot = PlanSlot {
                    exercise_id: exercise.id,
                    day_number: day.day_num,
                    position: item.order_in_day.unwrap_or(index as i32 + 1),
                };
                WorkoutPlanRepository::add_exercise(&mut *tx, record.id, slot)
                    .await
                    .map_err(ApiError::Internal)?;
            }
        }

        UserRepository::set_workout_plan(&mut *tx, user_id, record.id)
            .await
            .map_err(ApiError::Internal)?;

        tx.commit().await?;

        info!(user_id = %user_id, plan_id = %record.id, "Generated workout plan saved");
        Self::plan_details(pool, record.id).await
    }

    /// Record a lift for an exercise in the user's plan and bump the daily counter
    pub async fn log_exercise(
        pool: &PgPool,
        user_id: Uuid,
        req: LogExerciseRequest,
    ) -> Result<ExerciseLogResponse, ApiError> {
        validate_lift_weight(req.weight).map_err(|message| ApiError::InvalidField {
            field: "weight".to_string(),
            message,
        })?;

        let in_plan = ExerciseLogRepository::exercise_in_user_plan(pool, user_id, req.exercise_id)
            .await
            .map_err(ApiError::Internal)?;
        if !in_plan {
            return Err(ApiError::NotFound(
                "Exercise is not part of your workout plan".to_string(),
            ));
        }

        let today = Utc::now().date_naive();
        let mut tx = pool.begin().await?;
        let log_id = ExerciseLogRepository::create(&mut *tx, user_id, req.exercise_id, req.weight)
            .await
            .map_err(ApiError::Internal)?;
        let counter = UserRepository::increment_daily_counter(&mut *tx, user_id, today)
            .await
            .map_err(ApiError::Internal)?;
        tx.commit().await?;

        tracing::debug!(user_id = %user_id, counter, "Exercise logged");

        let record = ExerciseLogRepository::find_by_id(pool, log_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Exercise log not found".to_string()))?;
        Ok(record.into())
    }

    pub async fn today_logs(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<ExerciseLogResponse>, ApiError> {
        let (start, end) = day_bounds(Utc::now().date_naive());
        let logs = ExerciseLogRepository::list_between(pool, user_id, start, end)
            .await
            .map_err(ApiError::Internal)?;
        Ok(logs.into_iter().map(Into::into).collect())
    }

    pub async fn recent_logs(
        pool: &PgPool,
        user_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<ExerciseLogResponse>, ApiError> {
        let limit = limit
            .unwrap_or(DEFAULT_RECENT_LOGS)
            .clamp(1, MAX_RECENT_LOGS);
        let logs = ExerciseLogRepository::recent(pool, user_id, limit)
            .await
            .map_err(ApiError::Internal)?;
        Ok(logs.into_iter().map(Into::into).collect())
    }

    /// Exercises scheduled for `today` in the user's plan
    pub async fn exercises_for_date(
        pool: &PgPool,
        user: &UserRecord,
        today: NaiveDate,
    ) -> Result<Vec<PlannedExercise>, ApiError> {
        let Some(plan_id) = user.workout_plan_id else {
            return Ok(Vec::new());
        };
        let exercises =
            WorkoutPlanRepository::exercises_for_day(pool, plan_id, day_number_for(today))
                .await
                .map_err(ApiError::Internal)?;
        Ok(exercises.into_iter().map(Into::into).collect())
    }

    /// Planned versus completed exercises for today
    pub async fn today_stats(pool: &PgPool, user_id: Uuid) -> Result<TodayStatsResponse, ApiError> {
        let user = Self::load_user(pool, user_id).await?;
        let today = Utc::now().date_naive();

        let planned = Self::exercises_for_date(pool, &user, today).await?;
        let logs = Self::today_logs(pool, user_id).await?;

        Ok(TodayStatsResponse {
            exercises_completed: logs.len() as i64,
            total_exercises: planned.len() as i64,
            day_of_week: day_number_for(today) as u32,
            daily_counter: user.daily_counter_on(today),
            recent_logs: logs,
        })
    }
}
