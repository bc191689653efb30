//! Database repositories
//!
//! Provides data access layer for database operations.

pub mod analytics;
pub mod chat;
pub mod diet;
pub mod message;
pub mod reset_token;
pub mod user;
pub mod workout;

pub use analytics::AnalyticsRepository;
pub use chat::{ChatMessageRecord, ChatRepository};
pub use diet::{
    DietPlanRecord, DietPlanRepository, MealRecord, MealRepository, NewMeal, PlanMealRecord,
};
pub use message::{MessageRecord, MessageRepository};
pub use reset_token::{ResetTokenRecord, ResetTokenRepository};
pub use user::{UpdateUserProfile, UserRecord, UserRepository};
pub use workout::{
    ExerciseLogRecord, ExerciseLogRepository, ExerciseRecord, ExerciseRepository,
    PlanExerciseRecord, PlanSlot, WorkoutPlanRecord, WorkoutPlanRepository,
};
