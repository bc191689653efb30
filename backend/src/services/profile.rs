//! Profile service - business logic for user profile management

use crate::error::ApiError;
use crate::repositories::{
    DietPlanRepository, UpdateUserProfile, UserRecord, UserRepository, WorkoutPlanRepository,
};
use crate::services::WorkoutService;
use chrono::{NaiveDate, Utc};
use fittrack_shared::types::{PlanSummary, ProfileResponse, UpdateProfileRequest};
use fittrack_shared::validation::{
    get_field_display_label, validate_date_of_birth, validate_fitness_goal, validate_gender,
    validate_height_cm, validate_training_days, validate_weight,
};
use fittrack_shared::{age_on, FitnessGoal};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

fn field_error(field: &str, message: String) -> ApiError {
    ApiError::InvalidField {
        field: field.to_string(),
        message: format!("{}: {}", get_field_display_label(field), message),
    }
}

/// Profile service for user profile operations
pub struct ProfileService;

impl ProfileService {
    /// Profile with assigned plans and the exercises scheduled for today
    pub async fn get_profile(db: &PgPool, user_id: Uuid) -> Result<ProfileResponse, ApiError> {
        let user = UserRepository::find_by_id(db, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Self::build_response(db, user).await
    }

    async fn build_response(db: &PgPool, user: UserRecord) -> Result<ProfileResponse, ApiError> {
        let today = Utc::now().date_naive();

        let workout_plan = match user.workout_plan_id {
            Some(id) => WorkoutPlanRepository::find_by_id(db, id)
                .await
                .map_err(ApiError::Internal)?
                .map(|p| PlanSummary {
                    id: p.id,
                    name: p.name,
                    description: p.description,
                }),
            None => None,
        };

        let diet_plan = match user.diet_plan_id {
            Some(id) => DietPlanRepository::find_by_id(db, id)
                .await
                .map_err(ApiError::Internal)?
                .map(|p| PlanSummary {
                    id: p.id,
                    name: p.name,
                    description: p.description,
                }),
            None => None,
        };

        let today_exercises = WorkoutService::exercises_for_date(db, &user, today).await?;

        Ok(ProfileResponse {
            id: user.id.to_string(),
            role: user.role(),
            age_years: user.birth_date.and_then(|d| age_on(d, today).ok()),
            weight: user.weight(),
            height: user.height(),
            missing_fields: user.missing_profile_fields(),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            gender: user.gender,
            birth_date: user.birth_date,
            number_of_training_days: user.number_of_training_days,
            fitness_goal: user.fitness_goal,
            workout_plan,
            diet_plan,
            today_exercises,
            created_at: user.created_at,
        })
    }

    /// Validate profile update request
    fn validate_profile_update(req: &UpdateProfileRequest, today: NaiveDate) -> Result<(), ApiError> {
        req.validate()?;

        if let Some(weight) = req.weight {
            validate_weight(weight).map_err(|m| field_error("weight", m))?;
        }
        if let Some(height) = req.height {
            validate_height_cm(height).map_err(|m| field_error("height", m))?;
        }
        if let Some(dob) = req.birth_date {
            validate_date_of_birth(dob, today).map_err(|m| field_error("birth_date", m))?;
        }
        if let Some(ref gender) = req.gender {
            validate_gender(gender).map_err(|m| field_error("gender", m))?;
        }
        if let Some(days) = req.number_of_training_days {
            validate_training_days(days).map_err(|m| field_error("number_of_training_days", m))?;
        }
        if let Some(ref goal) = req.fitness_goal {
            validate_fitness_goal(goal).map_err(|m| field_error("fitness_goal", m))?;
        }

        Ok(())
    }

    /// Update user profile with validation
    pub async fn update_profile(
        db: &PgPool,
        user_id: Uuid,
        req: UpdateProfileRequest,
    ) -> Result<ProfileResponse, ApiError> {
        Self::validate_profile_update(&req, Utc::now().date_naive())?;

        let updates = UpdateUserProfile {
            first_name: req.first_name.map(|s| s.trim().to_string()),
            last_name: req.last_name.map(|s| s.trim().to_string()),
            gender: req.gender.map(|g| g.trim().to_lowercase()),
            birth_date: req.birth_date,
            weight_kg: req.weight,
            height_cm: req.height,
            number_of_training_days: req.number_of_training_days,
            // Stored in canonical form so later parsing never disagrees
            fitness_goal: req
                .fitness_goal
                .as_deref()
                .map(|g| FitnessGoal::parse(Some(g)).as_str().to_string()),
        };

        let user = UserRepository::update_profile(db, user_id, updates)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        tracing::info!(user_id = %user_id, "Profile updated");
        Self::build_response(db, user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn test_empty_update_is_valid() {
        assert!(ProfileService::validate_profile_update(&UpdateProfileRequest::default(), today()).is_ok());
    }

    #[test]
    fn test_invalid_fields_are_named() {
        let cases = [
            (
                UpdateProfileRequest {
                    weight: Some(5.0),
                    ..Default::default()
                },
                "weight",
            ),
            (
                UpdateProfileRequest {
                    number_of_training_days: Some(9),
                    ..Default::default()
                },
                "number_of_training_days",
            ),
            (
                UpdateProfileRequest {
                    birth_date: NaiveDate::from_ymd_opt(2030, 1, 1),
                    ..Default::default()
                },
                "birth_date",
            ),
            (
                UpdateProfileRequest {
                    fitness_goal: Some("bulk".to_string()),
                    ..Default::default()
                },
                "fitness_goal",
            ),
            (
                UpdateProfileRequest {
                    gender: Some("  ".to_string()),
                    ..Default::default()
                },
                "gender",
            ),
        ];

        for (req, expected) in cases {
            match ProfileService::validate_profile_update(&req, today()) {
                Err(ApiError::InvalidField { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected {} error, got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn test_valid_update_passes() {
        let req = UpdateProfileRequest {
            weight: Some(82.5),
            height: Some(180.0),
            birth_date: NaiveDate::from_ymd_opt(1990, 3, 1),
            gender: Some("Female".to_string()),
            number_of_training_days: Some(4),
            fitness_goal: Some("muscle_gain".to_string()),
            ..Default::default()
        };
        assert!(ProfileService::validate_profile_update(&req, today()).is_ok());
    }
}
