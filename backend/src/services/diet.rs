//! Diet plans and calorie-based plan matching

use crate::error::ApiError;
use crate::repositories::{
    DietPlanRecord, DietPlanRepository, MealRecord, MealRepository, NewMeal, PlanMealRecord,
    UserRepository,
};
use crate::services::EnergyService;
use crate::telemetry;
use chrono::Utc;
use fittrack_shared::types::{
    DietPlanResponse, GeneratedDietPlan, MacroTotals, MealResponse, PlanMealResponse,
};
use fittrack_shared::{build_match_response, MealType, PlanMatchResponse};
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

impl From<MealRecord> for MealResponse {
    fn from(r: MealRecord) -> Self {
        MealResponse {
            id: r.id,
            name: r.name,
            description: r.description,
            calories: r.calories,
            protein: r.protein,
            carbs: r.carbs,
            fats: r.fats,
        }
    }
}

impl From<PlanMealRecord> for PlanMealResponse {
    fn from(r: PlanMealRecord) -> Self {
        PlanMealResponse {
            meal_type: r.slot(),
            meal_id: r.meal_id,
            name: r.name,
            description: r.description,
            calories: r.calories,
            protein: r.protein,
            carbs: r.carbs,
            fats: r.fats,
        }
    }
}

/// Split linked meals into slots and sum their macros
fn assemble_plan(plan: DietPlanRecord, meals: Vec<PlanMealRecord>) -> DietPlanResponse {
    let mut totals = MacroTotals::default();
    let mut breakfast = Vec::new();
    let mut lunch = Vec::new();
    let mut dinner = Vec::new();

    for meal in meals {
        totals.calories += meal.calories as i64;
        totals.protein += meal.protein as i64;
        totals.carbs += meal.carbs as i64;
        totals.fats += meal.fats as i64;

        let meal: PlanMealResponse = meal.into();
        match meal.meal_type {
            MealType::Breakfast => breakfast.push(meal),
            MealType::Lunch => lunch.push(meal),
            MealType::Dinner => dinner.push(meal),
        }
    }

    DietPlanResponse {
        id: plan.id,
        name: plan.name,
        description: plan.description,
        breakfast,
        lunch,
        dinner,
        totals,
    }
}

fn validate_generated_plan(plan: &GeneratedDietPlan) -> Result<(), ApiError> {
    if plan.name.trim().is_empty() {
        return Err(ApiError::InvalidField {
            field: "name".to_string(),
            message: "Plan name is required".to_string(),
        });
    }
    if plan.meals_by_type().next().is_none() {
        return Err(ApiError::Validation(
            "A diet plan needs at least one meal".to_string(),
        ));
    }
    for (_, meal) in plan.meals_by_type() {
        if meal.food.trim().is_empty() {
            return Err(ApiError::InvalidField {
                field: "food".to_string(),
                message: "Every meal needs a name".to_string(),
            });
        }
        if [meal.calories, meal.protein, meal.carbs, meal.fats]
            .iter()
            .any(|v| *v < 0)
        {
            return Err(ApiError::Validation(format!(
                "{}: nutrition values cannot be negative",
                meal.food
            )));
        }
    }
    Ok(())
}

pub struct DietService;

impl DietService {
    pub async fn plan_details(pool: &PgPool, plan_id: Uuid) -> Result<DietPlanResponse, ApiError> {
        let plan = DietPlanRepository::find_by_id(pool, plan_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Diet plan not found".to_string()))?;
        let meals = DietPlanRepository::meals(pool, plan_id)
            .await
            .map_err(ApiError::Internal)?;
        Ok(assemble_plan(plan, meals))
    }

    /// The user's assigned plan
    pub async fn assigned_plan(pool: &PgPool, user_id: Uuid) -> Result<DietPlanResponse, ApiError> {
        let user = UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
        let plan_id = user
            .diet_plan_id
            .ok_or_else(|| ApiError::NotFound("No diet plan assigned".to_string()))?;
        Self::plan_details(pool, plan_id).await
    }

    /// Rank stored diet plans against the user's calorie target.
    ///
    /// `goal` overrides the stored fitness goal for this request only.
    /// Zero matches is a successful response carrying a warning.
    pub async fn matches(
        pool: &PgPool,
        user_id: Uuid,
        goal: Option<&str>,
    ) -> Result<PlanMatchResponse, ApiError> {
        let user = UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        let goal = goal
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .or(user.fitness_goal.as_deref());
        let energy = EnergyService::compute(&user.biometric_input(), goal, Utc::now().date_naive())?;

        let candidates = DietPlanRepository::candidates_near(pool, energy.target_calories)
            .await
            .map_err(ApiError::Internal)?;

        let response = build_match_response(
            energy.tdee,
            energy.target_calories,
            &candidates,
            Utc::now(),
        );

        let outcome = if response.plans.is_empty() { "empty" } else { "matched" };
        metrics::counter!(telemetry::PLAN_MATCHES, "outcome" => outcome).increment(1);
        debug!(
            user_id = %user_id,
            target = energy.target_calories,
            matches = response.plans.len(),
            "Diet plans matched"
        );

        Ok(response)
    }

    pub async fn select_plan(
        pool: &PgPool,
        user_id: Uuid,
        plan_id: Uuid,
    ) -> Result<DietPlanResponse, ApiError> {
        let plan = Self::plan_details(pool, plan_id).await?;
        UserRepository::set_diet_plan(pool, user_id, plan_id)
            .await
            .map_err(ApiError::Internal)?;
        info!(user_id = %user_id, plan_id = %plan_id, "Diet plan selected");
        Ok(plan)
    }

    /// Persist a generated plan with its meals and assign it, all in one
    /// transaction.
    pub async fn save_generated(
        pool: &PgPool,
        user_id: Uuid,
        plan: GeneratedDietPlan,
    ) -> Result<DietPlanResponse, ApiError> {
        validate_generated_plan(&plan)?;

        let mut tx = pool.begin().await?;

        let record = DietPlanRepository::create(&mut *tx, plan.name.trim(), plan.description.as_deref())
            .await
            .map_err(ApiError::Internal)?;

        for (meal_type, meal) in plan.meals_by_type() {
            let created = MealRepository::create(
                &mut *tx,
                NewMeal {
                    name: meal.food.trim(),
                    description: meal.description.as_deref(),
                    calories: meal.calories,
                    protein: meal.protein,
                    carbs: meal.carbs,
                    fats: meal.fats,
                },
            )
            .await
            .map_err(ApiError::Internal)?;

            DietPlanRepository::add_meal(&mut *tx, record.id, created.id, meal_type)
                .await
                .map_err(ApiError::Internal)?;
        }

        UserRepository::set_diet_plan(&mut *tx, user_id, record.id)
            .await
            .map_err(ApiError::Internal)?;

        tx.commit().await?;

        info!(user_id = %user_id, plan_id = %record.id, "Generated diet plan saved");
        Self::plan_details(pool, record.id).await
    }
}
