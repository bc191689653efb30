//! FitTrack Shared Library
//!
//! This crate contains the calorie engine (BMR, TDEE, goal targets, diet
//! plan matching), domain enums and the API contract types used across the
//! backend and WASM modules.

pub mod age;
pub mod energy;
pub mod errors;
pub mod models;
pub mod plan_matching;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use age::{age_on, age_today};
pub use energy::{
    estimate_energy, estimate_from_input, ActivityTier, BiometricInput, BiometricProfile,
    EnergyEstimate, FitnessGoal, GoalTargets, Sex,
};
pub use errors::EnergyError;
pub use models::{MealType, MessageStatus, MessageType, Role};
pub use plan_matching::{
    build_match_response, match_plans, DietPlanCandidate, MatchedPlan, PlanMatchResponse, PlanMeal,
    CALORIE_TOLERANCE, MIN_MEALS_PER_PLAN,
};
