//! Staff and admin operations: moderators, catalogue authoring, analytics

use crate::error::ApiError;
use crate::repositories::{
    AnalyticsRepository, DietPlanRepository, ExerciseRepository, MealRepository, NewMeal,
    PlanSlot, UserRecord, UserRepository, WorkoutPlanRepository,
};
use crate::services::{DietService, WorkoutService};
use chrono::{Duration, Months, NaiveTime, Utc};
use fittrack_shared::types::{
    AddDietPlanMealRequest, AnalyticsResponse, CreateDietPlanRequest, CreateExerciseRequest,
    CreateMealRequest, CreateWorkoutPlanRequest, DietPlanResponse, ExerciseResponse, MealResponse,
    PlanExerciseInput, PlanSummary, StaffMemberResponse, WorkoutPlanResponse, WorkoutPlanSummary,
};
use fittrack_shared::Role;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

impl From<UserRecord> for StaffMemberResponse {
    fn from(u: UserRecord) -> Self {
        StaffMemberResponse {
            role: u.role(),
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            created_at: u.created_at,
        }
    }
}

fn optional_text(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Check a slot against the plan's day count and default its position
fn resolve_slot(input: &PlanExerciseInput, number_of_days: i32) -> Result<PlanSlot, ApiError> {
    if !(1..=number_of_days).contains(&input.day_number) {
        return Err(ApiError::InvalidField {
            field: "day_number".to_string(),
            message: format!("Day must be between 1 and {}", number_of_days),
        });
    }
    let position = input.position.unwrap_or(1);
    if position < 1 {
        return Err(ApiError::InvalidField {
            field: "position".to_string(),
            message: "Position must be at least 1".to_string(),
        });
    }
    Ok(PlanSlot {
        exercise_id: input.exercise_id,
        day_number: input.day_number,
        position,
    })
}

pub struct AdminService;

impl AdminService {
    // ========================================================================
    // Moderators
    // ========================================================================

    pub async fn list_moderators(pool: &PgPool) -> Result<Vec<StaffMemberResponse>, ApiError> {
        let users = UserRepository::list_by_role(pool, Role::Moderator)
            .await
            .map_err(ApiError::Internal)?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    /// Give the account with `email` the moderator role
    pub async fn promote_moderator(pool: &PgPool, email: &str) -> Result<StaffMemberResponse, ApiError> {
        let email = email.trim().to_lowercase();
        let user = UserRepository::find_by_email(pool, &email)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        match user.role() {
            Role::Admin => {
                return Err(ApiError::Conflict(
                    "Admins cannot be made moderators".to_string(),
                ))
            }
            Role::Moderator => {
                return Err(ApiError::Conflict("User is already a moderator".to_string()))
            }
            Role::User => {}
        }

        let user = UserRepository::set_role_by_email(pool, &email, Role::Moderator)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        info!(user_id = %user.id, "Moderator added");
        Ok(user.into())
    }

    /// Demote a moderator back to a regular user. The account is kept.
    pub async fn remove_moderator(pool: &PgPool, email: &str) -> Result<(), ApiError> {
        let email = email.trim().to_lowercase();
        let user = UserRepository::find_by_email(pool, &email)
            .await
            .map_err(ApiError::Internal)?
            .filter(|u| u.role() == Role::Moderator)
            .ok_or_else(|| ApiError::NotFound("Moderator not found".to_string()))?;

        UserRepository::set_role_by_email(pool, &email, Role::User)
            .await
            .map_err(ApiError::Internal)?;

        info!(user_id = %user.id, "Moderator removed");
        Ok(())
    }

    // ========================================================================
    // Exercises
    // ========================================================================

    pub async fn list_exercises(pool: &PgPool) -> Result<Vec<ExerciseResponse>, ApiError> {
        let exercises = ExerciseRepository::list(pool)
            .await
            .map_err(ApiError::Internal)?;
        Ok(exercises.into_iter().map(Into::into).collect())
    }

    pub async fn create_exercise(
        pool: &PgPool,
        req: CreateExerciseRequest,
    ) -> Result<ExerciseResponse, ApiError> {
        req.validate()?;
        let exercise = ExerciseRepository::create(
            pool,
            req.name.trim(),
            optional_text(&req.description),
            req.sets,
            req.reps,
        )
        .await
        .map_err(ApiError::Internal)?;
        Ok(exercise.into())
    }

    pub async fn delete_exercise(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        if !ExerciseRepository::delete(pool, id)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::NotFound("Exercise not found".to_string()));
        }
        Ok(())
    }

    // ========================================================================
    // Workout plans
    // ========================================================================

    pub async fn list_workout_plans(pool: &PgPool) -> Result<Vec<WorkoutPlanSummary>, ApiError> {
        let plans = WorkoutPlanRepository::list(pool)
            .await
            .map_err(ApiError::Internal)?;
        Ok(plans.into_iter().map(Into::into).collect())
    }

    pub async fn create_workout_plan(
        pool: &PgPool,
        req: CreateWorkoutPlanRequest,
    ) -> Result<WorkoutPlanSummary, ApiError> {
        req.validate()?;
        let plan = WorkoutPlanRepository::create(
            pool,
            req.name.trim(),
            optional_text(&req.description),
            req.number_of_days,
        )
        .await
        .map_err(ApiError::Internal)?;
        Ok(plan.into())
    }

    async fn plan_days(pool: &PgPool, plan_id: Uuid) -> Result<i32, ApiError> {
        WorkoutPlanRepository::find_by_id(pool, plan_id)
            .await
            .map_err(ApiError::Internal)?
            .map(|p| p.number_of_days)
            .ok_or_else(|| ApiError::NotFound("Workout plan not found".to_string()))
    }

    async fn ensure_exercise(pool: &PgPool, exercise_id: Uuid) -> Result<(), ApiError> {
        if ExerciseRepository::exists(pool, exercise_id)
            .await
            .map_err(ApiError::Internal)?
        {
            Ok(())
        } else {
            Err(ApiError::NotFound(format!("Exercise {} not found", exercise_id)))
        }
    }

    pub async fn add_plan_exercise(
        pool: &PgPool,
        plan_id: Uuid,
        input: PlanExerciseInput,
    ) -> Result<WorkoutPlanResponse, ApiError> {
        let slot = resolve_slot(&input, Self::plan_days(pool, plan_id).await?)?;
        Self::ensure_exercise(pool, slot.exercise_id).await?;

        WorkoutPlanRepository::add_exercise(pool, plan_id, slot)
            .await
            .map_err(ApiError::Internal)?;
        WorkoutService::plan_details(pool, plan_id).await
    }

    /// Replace the whole schedule of a plan
    pub async fn replace_plan_exercises(
        pool: &PgPool,
        plan_id: Uuid,
        inputs: Vec<PlanExerciseInput>,
    ) -> Result<WorkoutPlanResponse, ApiError> {
        let days = Self::plan_days(pool, plan_id).await?;
        let slots = inputs
            .iter()
            .map(|input| resolve_slot(input, days))
            .collect::<Result<Vec<_>, _>>()?;
        for slot in &slots {
            Self::ensure_exercise(pool, slot.exercise_id).await?;
        }

        WorkoutPlanRepository::replace_exercises(pool, plan_id, &slots)
            .await
            .map_err(ApiError::Internal)?;
        WorkoutService::plan_details(pool, plan_id).await
    }

    pub async fn remove_plan_exercise(
        pool: &PgPool,
        plan_id: Uuid,
        exercise_id: Uuid,
        day_number: i32,
    ) -> Result<(), ApiError> {
        if !WorkoutPlanRepository::remove_exercise(pool, plan_id, exercise_id, day_number)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::NotFound("Plan exercise not found".to_string()));
        }
        Ok(())
    }

    // ========================================================================
    // Meals and diet plans
    // ========================================================================

    pub async fn list_meals(pool: &PgPool) -> Result<Vec<MealResponse>, ApiError> {
        let meals = MealRepository::list(pool).await.map_err(ApiError::Internal)?;
        Ok(meals.into_iter().map(Into::into).collect())
    }

    pub async fn create_meal(pool: &PgPool, req: CreateMealRequest) -> Result<MealResponse, ApiError> {
        req.validate()?;
        let meal = MealRepository::create(
            pool,
            NewMeal {
                name: req.name.trim(),
                description: optional_text(&req.description),
                calories: req.calories,
                protein: req.protein,
                carbs: req.carbs,
                fats: req.fats,
            },
        )
        .await
        .map_err(ApiError::Internal)?;
        Ok(meal.into())
    }

    pub async fn delete_meal(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        if !MealRepository::delete(pool, id)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::NotFound("Meal not found".to_string()));
        }
        Ok(())
    }

    pub async fn list_diet_plans(pool: &PgPool) -> Result<Vec<PlanSummary>, ApiError> {
        let plans = DietPlanRepository::list(pool)
            .await
            .map_err(ApiError::Internal)?;
        Ok(plans
            .into_iter()
            .map(|p| PlanSummary {
                id: p.id,
                name: p.name,
                description: p.description,
            })
            .collect())
    }

    pub async fn create_diet_plan(
        pool: &PgPool,
        req: CreateDietPlanRequest,
    ) -> Result<PlanSummary, ApiError> {
        req.validate()?;
        let plan = DietPlanRepository::create(pool, req.name.trim(), optional_text(&req.description))
            .await
            .map_err(ApiError::Internal)?;
        Ok(PlanSummary {
            id: plan.id,
            name: plan.name,
            description: plan.description,
        })
    }

    pub async fn delete_diet_plan(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        if !DietPlanRepository::delete(pool, id)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::NotFound("Diet plan not found".to_string()));
        }
        Ok(())
    }

    pub async fn add_plan_meal(
        pool: &PgPool,
        plan_id: Uuid,
        req: AddDietPlanMealRequest,
    ) -> Result<DietPlanResponse, ApiError> {
        if DietPlanRepository::find_by_id(pool, plan_id)
            .await
            .map_err(ApiError::Internal)?
            .is_none()
        {
            return Err(ApiError::NotFound("Diet plan not found".to_string()));
        }
        if !MealRepository::exists(pool, req.meal_id)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::NotFound("Meal not found".to_string()));
        }

        DietPlanRepository::add_meal(pool, plan_id, req.meal_id, req.meal_type)
            .await
            .map_err(ApiError::Internal)?;
        DietService::plan_details(pool, plan_id).await
    }

    pub async fn remove_plan_meal(pool: &PgPool, plan_id: Uuid, meal_id: Uuid) -> Result<(), ApiError> {
        if !DietPlanRepository::remove_meal(pool, plan_id, meal_id)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::NotFound("Plan meal not found".to_string()));
        }
        Ok(())
    }

    // ========================================================================
    // Analytics
    // ========================================================================

    /// Total accounts and distinct users who logged a lift today, in the
    /// last seven days and in the last month
    pub async fn analytics(pool: &PgPool) -> Result<AnalyticsResponse, ApiError> {
        let now = Utc::now();
        let start_of_day = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let week_ago = now - Duration::days(7);
        let month_ago = now.checked_sub_months(Months::new(1)).unwrap_or(now - Duration::days(30));

        let total_users = UserRepository::count(pool).await.map_err(ApiError::Internal)?;
        let daily = AnalyticsRepository::active_users_since(pool, start_of_day)
            .await
            .map_err(ApiError::Internal)?;
        let weekly = AnalyticsRepository::active_users_since(pool, week_ago)
            .await
            .map_err(ApiError::Internal)?;
        let monthly = AnalyticsRepository::active_users_since(pool, month_ago)
            .await
            .map_err(ApiError::Internal)?;

        Ok(AnalyticsResponse {
            total_users,
            daily_active_users: daily,
            weekly_active_users: weekly,
            monthly_active_users: monthly,
        })
    }
}
