//! Exercise, workout plan and lift log repositories

use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Exercise record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExerciseRecord {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Workout plan record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WorkoutPlanRecord {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub number_of_days: i32,
    pub created_at: DateTime<Utc>,
}

/// Exercise as scheduled within a plan
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlanExerciseRecord {
    pub exercise_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub day_number: i32,
    pub position: i32,
}

/// Lift log joined with its exercise
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExerciseLogRecord {
    pub id: Uuid,
    pub exercise_id: Uuid,
    pub exercise_name: String,
    pub weight_kg: Decimal,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub logged_at: DateTime<Utc>,
}

impl ExerciseLogRecord {
    pub fn weight(&self) -> f64 {
        self.weight_kg.to_f64().unwrap_or(0.0)
    }
}

/// Placement of an exercise in a plan
#[derive(Debug, Clone, Copy)]
pub struct PlanSlot {
    pub exercise_id: Uuid,
    pub day_number: i32,
    pub position: i32,
}

// ============================================================================
// Exercises
// ============================================================================

pub struct ExerciseRepository;

impl ExerciseRepository {
    pub async fn list(pool: &PgPool) -> Result<Vec<ExerciseRecord>> {
        let records = sqlx::query_as::<_, ExerciseRecord>(
            r#"
            SELECT id, name, description, sets, reps, created_at
            FROM exercises
            ORDER BY name
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        name: &str,
        description: Option<&str>,
        sets: Option<i32>,
        reps: Option<i32>,
    ) -> Result<ExerciseRecord> {
        let record = sqlx::query_as::<_, ExerciseRecord>(
            r#"
            INSERT INTO exercises (name, description, sets, reps)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, sets, reps, created_at
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(sets)
        .bind(reps)
        .fetch_one(executor)
        .await?;

        Ok(record)
    }

    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM exercises WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Returns true if a row was deleted
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM exercises WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// Workout plans
// ============================================================================

pub struct WorkoutPlanRepository;

impl WorkoutPlanRepository {
    pub async fn list(pool: &PgPool) -> Result<Vec<WorkoutPlanRecord>> {
        let records = sqlx::query_as::<_, WorkoutPlanRecord>(
            r#"
            SELECT id, name, description, number_of_days, created_at
            FROM workout_plans
            ORDER BY name
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Plans spanning exactly `days` days
    pub async fn list_by_days(pool: &PgPool, days: i32) -> Result<Vec<WorkoutPlanRecord>> {
        let records = sqlx::query_as::<_, WorkoutPlanRecord>(
            r#"
            SELECT id, name, description, number_of_days, created_at
            FROM workout_plans
            WHERE number_of_days = $1
            ORDER BY name
            "#,
        )
        .bind(days)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<WorkoutPlanRecord>> {
        let record = sqlx::query_as::<_, WorkoutPlanRecord>(
            r#"
            SELECT id, name, description, number_of_days, created_at
            FROM workout_plans
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        name: &str,
        description: Option<&str>,
        number_of_days: i32,
    ) -> Result<WorkoutPlanRecord> {
        let record = sqlx::query_as::<_, WorkoutPlanRecord>(
            r#"
            INSERT INTO workout_plans (name, description, number_of_days)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, number_of_days, created_at
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(number_of_days)
        .fetch_one(executor)
        .await?;

        Ok(record)
    }

    /// All scheduled exercises ordered by day then position
    pub async fn exercises(pool: &PgPool, plan_id: Uuid) -> Result<Vec<PlanExerciseRecord>> {
        let records = sqlx::query_as::<_, PlanExerciseRecord>(
            r#"
            SELECT e.id AS exercise_id, e.name, e.description, e.sets, e.reps,
                   wpe.day_number, wpe.position
            FROM workout_plan_exercises wpe
            JOIN exercises e ON e.id = wpe.exercise_id
            WHERE wpe.workout_plan_id = $1
            ORDER BY wpe.day_number, wpe.position
            "#,
        )
        .bind(plan_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    pub async fn exercises_for_day(
        pool: &PgPool,
        plan_id: Uuid,
        day_number: i32,
    ) -> Result<Vec<PlanExerciseRecord>> {
        let records = sqlx::query_as::<_, PlanExerciseRecord>(
            r#"
            SELECT e.id AS exercise_id, e.name, e.description, e.sets, e.reps,
                   wpe.day_number, wpe.position
            FROM workout_plan_exercises wpe
            JOIN exercises e ON e.id = wpe.exercise_id
            WHERE wpe.workout_plan_id = $1 AND wpe.day_number = $2
            ORDER BY wpe.position
            "#,
        )
        .bind(plan_id)
        .bind(day_number)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    pub async fn add_exercise<'e>(
        executor: impl PgExecutor<'e>,
        plan_id: Uuid,
        slot: PlanSlot,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO workout_plan_exercises (workout_plan_id, exercise_id, day_number, position)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (workout_plan_id, exercise_id, day_number)
            DO UPDATE SET position = EXCLUDED.position
            "#,
        )
        .bind(plan_id)
        .bind(slot.exercise_id)
        .bind(slot.day_number)
        .bind(slot.position)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Replace the whole schedule of a plan atomically
    pub async fn replace_exercises(pool: &PgPool, plan_id: Uuid, slots: &[PlanSlot]) -> Result<()> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM workout_plan_exercises WHERE workout_plan_id = $1")
            .bind(plan_id)
            .execute(&mut *tx)
            .await?;

        for slot in slots {
            Self::add_exercise(&mut *tx, plan_id, *slot).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Returns true if a row was deleted
    pub async fn remove_exercise(
        pool: &PgPool,
        plan_id: Uuid,
        exercise_id: Uuid,
        day_number: i32,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM workout_plan_exercises
            WHERE workout_plan_id = $1 AND exercise_id = $2 AND day_number = $3
            "#,
        )
        .bind(plan_id)
        .bind(exercise_id)
        .bind(day_number)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// Lift logs
// ============================================================================

pub struct ExerciseLogRepository;

impl ExerciseLogRepository {
    /// Whether `exercise_id` is scheduled in the user's assigned plan
    pub async fn exercise_in_user_plan(
        pool: &PgPool,
        user_id: Uuid,
        exercise_id: Uuid,
    ) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM workout_plan_exercises wpe
                JOIN users u ON u.workout_plan_id = wpe.workout_plan_id
                WHERE u.id = $1 AND wpe.exercise_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(exercise_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        user_id: Uuid,
        exercise_id: Uuid,
        weight_kg: f64,
    ) -> Result<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO exercise_weight_logs (user_id, exercise_id, weight_kg)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(exercise_id)
        .bind(Decimal::try_from(weight_kg)?)
        .fetch_one(executor)
        .await?;

        Ok(id)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<ExerciseLogRecord>> {
        let record = sqlx::query_as::<_, ExerciseLogRecord>(
            r#"
            SELECT l.id, l.exercise_id, e.name AS exercise_name, l.weight_kg,
                   e.sets, e.reps, l.logged_at
            FROM exercise_weight_logs l
            JOIN exercises e ON e.id = l.exercise_id
            WHERE l.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Logs in `[start, end)`, newest first
    pub async fn list_between(
        pool: &PgPool,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ExerciseLogRecord>> {
        let records = sqlx::query_as::<_, ExerciseLogRecord>(
            r#"
            SELECT l.id, l.exercise_id, e.name AS exercise_name, l.weight_kg,
                   e.sets, e.reps, l.logged_at
            FROM exercise_weight_logs l
            JOIN exercises e ON e.id = l.exercise_id
            WHERE l.user_id = $1 AND l.logged_at >= $2 AND l.logged_at < $3
            ORDER BY l.logged_at DESC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    pub async fn recent(pool: &PgPool, user_id: Uuid, limit: i64) -> Result<Vec<ExerciseLogRecord>> {
        let records = sqlx::query_as::<_, ExerciseLogRecord>(
            r#"
            SELECT l.id, l.exercise_id, e.name AS exercise_name, l.weight_kg,
                   e.sets, e.reps, l.logged_at
            FROM exercise_weight_logs l
            JOIN exercises e ON e.id = l.exercise_id
            WHERE l.user_id = $1
            ORDER BY l.logged_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }
}
