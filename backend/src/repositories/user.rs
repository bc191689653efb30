//! User repository for database operations

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use fittrack_shared::{BiometricInput, Role};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// User record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub weight_kg: Option<Decimal>,
    pub height_cm: Option<Decimal>,
    pub number_of_training_days: Option<i32>,
    pub fitness_goal: Option<String>,
    pub workout_plan_id: Option<Uuid>,
    pub diet_plan_id: Option<Uuid>,
    pub daily_counter: i32,
    pub counter_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Unknown role strings degrade to `user`
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or_default()
    }

    pub fn weight(&self) -> Option<f64> {
        self.weight_kg.and_then(|w| w.to_f64())
    }

    pub fn height(&self) -> Option<f64> {
        self.height_cm.and_then(|h| h.to_f64())
    }

    /// Stored biometrics as engine input
    pub fn biometric_input(&self) -> BiometricInput {
        BiometricInput {
            weight: self.weight(),
            height: self.height(),
            birth_date: self.birth_date,
            gender: self.gender.clone(),
            number_of_training_days: self.number_of_training_days,
        }
    }

    /// Profile fields still needed for energy estimates and plan matching
    pub fn missing_profile_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.weight_kg.is_none() {
            missing.push("weight".to_string());
        }
        if self.height_cm.is_none() {
            missing.push("height".to_string());
        }
        if self.birth_date.is_none() {
            missing.push("birth_date".to_string());
        }
        if self.gender.as_deref().map_or(true, |g| g.trim().is_empty()) {
            missing.push("gender".to_string());
        }
        if self.number_of_training_days.is_none() {
            missing.push("number_of_training_days".to_string());
        }
        if self.fitness_goal.is_none() {
            missing.push("fitness_goal".to_string());
        }
        missing
    }

    /// Exercises logged on `today`; the stored counter belongs to `counter_date`
    pub fn daily_counter_on(&self, today: NaiveDate) -> i32 {
        if self.counter_date == Some(today) {
            self.daily_counter
        } else {
            0
        }
    }
}

/// Input for updating profile attributes. `None` leaves a column unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub number_of_training_days: Option<i32>,
    pub fitness_goal: Option<String>,
}

/// User repository for database operations
pub struct UserRepository;

impl UserRepository {
    /// Create a new user with the default `user` role
    pub async fn create(
        pool: &PgPool,
        email: &str,
        password_hash: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<UserRecord> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(first_name)
        .bind(last_name)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT * FROM users WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT * FROM users WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Check if email exists
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)
            "#,
        )
        .bind(email)
        .fetch_one(pool)
        .await?;

        Ok(result)
    }

    /// Update profile attributes
    pub async fn update_profile(
        pool: &PgPool,
        user_id: Uuid,
        updates: UpdateUserProfile,
    ) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                gender = COALESCE($4, gender),
                birth_date = COALESCE($5, birth_date),
                weight_kg = COALESCE($6, weight_kg),
                height_cm = COALESCE($7, height_cm),
                number_of_training_days = COALESCE($8, number_of_training_days),
                fitness_goal = COALESCE($9, fitness_goal),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(updates.first_name)
        .bind(updates.last_name)
        .bind(updates.gender)
        .bind(updates.birth_date)
        .bind(updates.weight_kg.map(Decimal::try_from).transpose()?)
        .bind(updates.height_cm.map(Decimal::try_from).transpose()?)
        .bind(updates.number_of_training_days)
        .bind(updates.fitness_goal)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn update_password(pool: &PgPool, user_id: Uuid, password_hash: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn set_workout_plan<'e>(
        executor: impl PgExecutor<'e>,
        user_id: Uuid,
        plan_id: Uuid,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users SET workout_plan_id = $2, updated_at = NOW() WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(plan_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn set_diet_plan<'e>(
        executor: impl PgExecutor<'e>,
        user_id: Uuid,
        plan_id: Uuid,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users SET diet_plan_id = $2, updated_at = NOW() WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(plan_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Bump the per-day exercise counter, restarting at 1 on a new day.
    /// Returns the counter after the update.
    pub async fn increment_daily_counter<'e>(
        executor: impl PgExecutor<'e>,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<i32> {
        let counter = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE users SET
                daily_counter = CASE WHEN counter_date = $2 THEN daily_counter + 1 ELSE 1 END,
                counter_date = $2
            WHERE id = $1
            RETURNING daily_counter
            "#,
        )
        .bind(user_id)
        .bind(today)
        .fetch_one(executor)
        .await?;

        Ok(counter)
    }

    /// Change the role of the account with `email`
    pub async fn set_role_by_email(
        pool: &PgPool,
        email: &str,
        role: Role,
    ) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users SET role = $2, updated_at = NOW()
            WHERE email = $1
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(role.as_str())
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn list_by_role(pool: &PgPool, role: Role) -> Result<Vec<UserRecord>> {
        let users = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT * FROM users WHERE role = $1 ORDER BY email
            "#,
        )
        .bind(role.as_str())
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    pub async fn count(pool: &PgPool) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
