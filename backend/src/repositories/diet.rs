//! Meal and diet plan repositories

use anyhow::Result;
use chrono::{DateTime, Utc};
use fittrack_shared::{DietPlanCandidate, MealType, PlanMeal, CALORIE_TOLERANCE, MIN_MEALS_PER_PLAN};
use sqlx::{PgExecutor, PgPool};
use std::collections::HashMap;
use tracing::warn;
use uuid::Uuid;

/// Meal record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MealRecord {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub calories: i32,
    pub protein: i32,
    pub carbs: i32,
    pub fats: i32,
    pub created_at: DateTime<Utc>,
}

/// Diet plan record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DietPlanRecord {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Meal as linked into a plan
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlanMealRecord {
    pub diet_plan_id: Uuid,
    pub meal_id: Uuid,
    pub meal_type: String,
    pub name: String,
    pub description: Option<String>,
    pub calories: i32,
    pub protein: i32,
    pub carbs: i32,
    pub fats: i32,
}

impl PlanMealRecord {
    /// Slot for this link; an unknown `meal_type` is logged and filed as dinner
    pub fn slot(&self) -> MealType {
        self.meal_type.parse().unwrap_or_else(|_| {
            warn!(
                diet_plan_id = %self.diet_plan_id,
                meal_id = %self.meal_id,
                meal_type = %self.meal_type,
                "Unrecognized meal slot in diet plan, treating as dinner"
            );
            MealType::Dinner
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct CandidateRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    total_calories: i64,
    meal_count: i64,
}

/// Input for creating a meal
#[derive(Debug, Clone)]
pub struct NewMeal<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub calories: i32,
    pub protein: i32,
    pub carbs: i32,
    pub fats: i32,
}

// ============================================================================
// Meals
// ============================================================================

pub struct MealRepository;

impl MealRepository {
    pub async fn list(pool: &PgPool) -> Result<Vec<MealRecord>> {
        let records = sqlx::query_as::<_, MealRecord>(
            r#"
            SELECT * FROM meals ORDER BY name
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    pub async fn create<'e>(executor: impl PgExecutor<'e>, meal: NewMeal<'_>) -> Result<MealRecord> {
        let record = sqlx::query_as::<_, MealRecord>(
            r#"
            INSERT INTO meals (name, description, calories, protein, carbs, fats)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(meal.name)
        .bind(meal.description)
        .bind(meal.calories)
        .bind(meal.protein)
        .bind(meal.carbs)
        .bind(meal.fats)
        .fetch_one(executor)
        .await?;

        Ok(record)
    }

    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM meals WHERE id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }

    /// Returns true if a row was deleted
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM meals WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// Diet plans
// ============================================================================

pub struct DietPlanRepository;

impl DietPlanRepository {
    pub async fn list(pool: &PgPool) -> Result<Vec<DietPlanRecord>> {
        let records = sqlx::query_as::<_, DietPlanRecord>(
            r#"
            SELECT * FROM diet_plans ORDER BY name
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<DietPlanRecord>> {
        let record = sqlx::query_as::<_, DietPlanRecord>(
            r#"
            SELECT * FROM diet_plans WHERE id = $1
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
    ) -> Result<DietPlanRecord> {
        let record = sqlx::query_as::<_, DietPlanRecord>(
            r#"
            INSERT INTO diet_plans (name, description)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(executor)
        .await?;

        Ok(record)
    }

    /// Returns true if a row was deleted
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM diet_plans WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Linked meals ordered breakfast, lunch, dinner
    pub async fn meals(pool: &PgPool, plan_id: Uuid) -> Result<Vec<PlanMealRecord>> {
        let records = sqlx::query_as::<_, PlanMealRecord>(
            r#"
            SELECT dpm.diet_plan_id, m.id AS meal_id, dpm.meal_type, m.name, m.description,
                   m.calories, m.protein, m.carbs, m.fats
            FROM diet_plan_meals dpm
            JOIN meals m ON m.id = dpm.meal_id
            WHERE dpm.diet_plan_id = $1
            ORDER BY CASE dpm.meal_type
                WHEN 'breakfast' THEN 1
                WHEN 'lunch' THEN 2
                ELSE 3
            END, m.name
            "#,
        )
        .bind(plan_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    pub async fn add_meal<'e>(
        executor: impl PgExecutor<'e>,
        plan_id: Uuid,
        meal_id: Uuid,
        meal_type: MealType,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO diet_plan_meals (diet_plan_id, meal_id, meal_type)
            VALUES ($1, $2, $3)
            ON CONFLICT (diet_plan_id, meal_id) DO UPDATE SET meal_type = EXCLUDED.meal_type
            "#,
        )
        .bind(plan_id)
        .bind(meal_id)
        .bind(meal_type.as_str())
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Returns true if a link was deleted
    pub async fn remove_meal(pool: &PgPool, plan_id: Uuid, meal_id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM diet_plan_meals WHERE diet_plan_id = $1 AND meal_id = $2")
                .bind(plan_id)
                .bind(meal_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Plans whose summed meal calories fall within the tolerance band of
    /// `target`, with their meals attached.
    pub async fn candidates_near(pool: &PgPool, target: i64) -> Result<Vec<DietPlanCandidate>> {
        let rows = sqlx::query_as::<_, CandidateRow>(
            r#"
            SELECT dp.id, dp.name, dp.description,
                   SUM(m.calories)::BIGINT AS total_calories,
                   COUNT(*) AS meal_count
            FROM diet_plans dp
            JOIN diet_plan_meals dpm ON dpm.diet_plan_id = dp.id
            JOIN meals m ON m.id = dpm.meal_id
            GROUP BY dp.id, dp.name, dp.description
            HAVING COUNT(*) >= $2
               AND SUM(m.calories) BETWEEN $1 - $3 AND $1 + $3
            ORDER BY ABS(SUM(m.calories) - $1), dp.id
            "#,
        )
        .bind(target)
        .bind(MIN_MEALS_PER_PLAN)
        .bind(CALORIE_TOLERANCE)
        .fetch_all(pool)
        .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let meal_rows = sqlx::query_as::<_, PlanMealRecord>(
            r#"
            SELECT dpm.diet_plan_id, m.id AS meal_id, dpm.meal_type, m.name, m.description,
                   m.calories, m.protein, m.carbs, m.fats
            FROM diet_plan_meals dpm
            JOIN meals m ON m.id = dpm.meal_id
            WHERE dpm.diet_plan_id = ANY($1)
            ORDER BY CASE dpm.meal_type
                WHEN 'breakfast' THEN 1
                WHEN 'lunch' THEN 2
                ELSE 3
            END, m.name
            "#,
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;

        Ok(assemble_candidates(rows, meal_rows))
    }
}

fn assemble_candidates(
    rows: Vec<CandidateRow>,
    meal_rows: Vec<PlanMealRecord>,
) -> Vec<DietPlanCandidate> {
    let mut meals_by_plan: HashMap<Uuid, Vec<PlanMeal>> = HashMap::new();
    for meal in meal_rows {
        meals_by_plan.entry(meal.diet_plan_id).or_default().push(PlanMeal {
            meal_type: meal.meal_type,
            name: meal.name,
            calories: meal.calories,
            protein: meal.protein,
            carbs: meal.carbs,
            fats: meal.fats,
        });
    }

    rows.into_iter()
        .map(|row| DietPlanCandidate {
            meals: meals_by_plan.remove(&row.id).unwrap_or_default(),
            id: row.id,
            name: row.name,
            description: row.description,
            total_calories: row.total_calories,
            meal_count: row.meal_count,
        })
        .collect()
}
