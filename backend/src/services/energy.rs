//! Energy estimates for ad-hoc input and stored profiles

use crate::error::ApiError;
use crate::repositories::UserRepository;
use chrono::{NaiveDate, Utc};
use fittrack_shared::types::{EnergyRequest, EnergyResponse};
use fittrack_shared::{estimate_energy, ActivityTier, BiometricInput, FitnessGoal};
use sqlx::PgPool;
use uuid::Uuid;

pub struct EnergyService;

impl EnergyService {
    /// Estimate for a request body as of `today`
    pub fn estimate(req: &EnergyRequest, today: NaiveDate) -> Result<EnergyResponse, ApiError> {
        Self::compute(&req.biometrics, req.fitness_goal.as_deref(), today)
    }

    /// Estimate for the stored profile of `user_id`
    pub async fn for_user(pool: &PgPool, user_id: Uuid) -> Result<EnergyResponse, ApiError> {
        let user = UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Self::compute(
            &user.biometric_input(),
            user.fitness_goal.as_deref(),
            Utc::now().date_naive(),
        )
    }

    pub(crate) fn compute(
        input: &BiometricInput,
        goal: Option<&str>,
        today: NaiveDate,
    ) -> Result<EnergyResponse, ApiError> {
        let profile = input.resolve(today)?;
        let estimate = estimate_energy(&profile);
        let tier = ActivityTier::from_training_days(profile.training_days_per_week as i32);
        let goal = FitnessGoal::parse(goal);

        Ok(EnergyResponse {
            bmr: estimate.bmr,
            tdee: estimate.tdee,
            targets: estimate.targets,
            age_years: profile.age_years,
            activity_level: tier.label().to_string(),
            activity_multiplier: tier.multiplier(),
            fitness_goal: goal.as_str().to_string(),
            target_calories: estimate.targets.for_goal(goal),
        })
    }
}
