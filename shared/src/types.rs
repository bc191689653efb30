//! API request and response types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::energy::{BiometricInput, GoalTargets};
use crate::models::{MealType, MessageStatus, MessageType, Role};

/// Simple acknowledgement body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    pub message: String,
}

impl AckResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Auth Types
// ============================================================================

/// Authentication tokens response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub role: Role,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
}

/// Authenticated account summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Reset token is required"))]
    pub token: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub new_password: String,
}

// ============================================================================
// Profile Types
// ============================================================================

/// Profile update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub number_of_training_days: Option<i32>,
    pub fitness_goal: Option<String>,
}

/// Reference to an assigned plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// Full user profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub age_years: Option<u32>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub number_of_training_days: Option<i32>,
    pub fitness_goal: Option<String>,
    pub workout_plan: Option<PlanSummary>,
    pub diet_plan: Option<PlanSummary>,
    /// Exercises scheduled for today's plan day
    pub today_exercises: Vec<PlannedExercise>,
    /// Profile fields still needed for an energy estimate
    pub missing_fields: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Energy estimate request: biometrics plus an optional goal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnergyRequest {
    #[serde(flatten)]
    pub biometrics: BiometricInput,
    pub fitness_goal: Option<String>,
}

/// Energy estimate with the selected goal target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyResponse {
    pub bmr: i64,
    pub tdee: i64,
    pub targets: GoalTargets,
    pub age_years: u32,
    pub activity_level: String,
    pub activity_multiplier: f64,
    pub fitness_goal: String,
    pub target_calories: i64,
}

// ============================================================================
// Workout Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
}

/// Exercise slotted into a plan day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedExercise {
    pub exercise_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub day_number: i32,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutDay {
    pub day_number: i32,
    pub exercises: Vec<PlannedExercise>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutPlanResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub number_of_days: i32,
    pub days: Vec<WorkoutDay>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutPlanSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub number_of_days: i32,
}

/// Assign an existing workout or diet plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectPlanRequest {
    pub plan_id: Uuid,
}

/// Accepts integers, numeric strings and ranges like "8-12" (first number wins)
fn lenient_count<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match &value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .map(|n| n as i32)
            .ok_or_else(|| serde::de::Error::custom("count out of range")),
        serde_json::Value::String(s) => s
            .split(|c: char| !c.is_ascii_digit())
            .find(|part| !part.is_empty())
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| serde::de::Error::custom(format!("invalid count: {}", s))),
        _ => Err(serde::de::Error::custom("count must be a number")),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedExerciseInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPlanExercise {
    pub exercise: GeneratedExerciseInfo,
    #[serde(deserialize_with = "lenient_count")]
    pub sets: i32,
    #[serde(deserialize_with = "lenient_count")]
    pub reps: i32,
    #[serde(default)]
    pub order_in_day: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedWorkoutDay {
    pub day_num: i32,
    pub exercises: Vec<GeneratedPlanExercise>,
}

/// Workout plan in the shape the generator is asked to produce
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedWorkoutPlan {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub num_of_days: i32,
    pub days: Vec<GeneratedWorkoutDay>,
}

/// Envelope the generator wraps the plan in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedWorkoutEnvelope {
    pub workout_plan: GeneratedWorkoutPlan,
}

/// Log one lift
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogExerciseRequest {
    pub exercise_id: Uuid,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseLogResponse {
    pub id: Uuid,
    pub exercise_id: Uuid,
    pub exercise_name: String,
    pub weight: f64,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub logged_at: DateTime<Utc>,
}

/// Today's planned vs completed exercise counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodayStatsResponse {
    pub exercises_completed: i64,
    pub total_exercises: i64,
    /// ISO weekday, Monday = 1 ... Sunday = 7
    pub day_of_week: u32,
    pub daily_counter: i32,
    pub recent_logs: Vec<ExerciseLogResponse>,
}

// ============================================================================
// Diet Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub calories: i32,
    pub protein: i32,
    pub carbs: i32,
    pub fats: i32,
}

/// Meal linked into a diet plan slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanMealResponse {
    pub meal_id: Uuid,
    pub meal_type: MealType,
    pub name: String,
    pub description: Option<String>,
    pub calories: i32,
    pub protein: i32,
    pub carbs: i32,
    pub fats: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroTotals {
    pub calories: i64,
    pub protein: i64,
    pub carbs: i64,
    pub fats: i64,
}

/// Diet plan with meals grouped by slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DietPlanResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub breakfast: Vec<PlanMealResponse>,
    pub lunch: Vec<PlanMealResponse>,
    pub dinner: Vec<PlanMealResponse>,
    pub totals: MacroTotals,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DietMatchQuery {
    /// Overrides the stored fitness goal
    pub goal: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedMeal {
    pub food: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_count")]
    pub calories: i32,
    #[serde(deserialize_with = "lenient_count")]
    pub protein: i32,
    #[serde(deserialize_with = "lenient_count")]
    pub carbs: i32,
    #[serde(rename = "fat", alias = "fats", deserialize_with = "lenient_count")]
    pub fats: i32,
}

/// Diet plan in the shape the generator is asked to produce
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedDietPlan {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub breakfast: Vec<GeneratedMeal>,
    #[serde(default)]
    pub lunch: Vec<GeneratedMeal>,
    #[serde(default)]
    pub dinner: Vec<GeneratedMeal>,
}

impl GeneratedDietPlan {
    /// Meals paired with their slot, in day order
    pub fn meals_by_type(&self) -> impl Iterator<Item = (MealType, &GeneratedMeal)> {
        self.breakfast
            .iter()
            .map(|m| (MealType::Breakfast, m))
            .chain(self.lunch.iter().map(|m| (MealType::Lunch, m)))
            .chain(self.dinner.iter().map(|m| (MealType::Dinner, m)))
    }
}

// ============================================================================
// Message Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMessageRequest {
    pub message_type: String,
    #[validate(length(min = 1, max = 5000, message = "Content must be 1-5000 characters"))]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSender {
    pub user_id: Option<Uuid>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub message_type: MessageType,
    pub content: String,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<MessageSender>,
}

/// Status change; defaults to "seen" when omitted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMessageStatusRequest {
    pub status: Option<String>,
}

// ============================================================================
// Admin Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoteModeratorRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffMemberResponse {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateExerciseRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub sets: Option<i32>,
    #[validate(range(min = 1, max = 1000))]
    pub reps: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateWorkoutPlanRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 1, max = 7, message = "Plans span 1-7 days"))]
    pub number_of_days: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanExerciseInput {
    pub exercise_id: Uuid,
    pub day_number: i32,
    #[serde(default)]
    pub position: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanExercisesRequest {
    pub exercises: Vec<PlanExerciseInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMealRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0, max = 10000))]
    pub calories: i32,
    #[validate(range(min = 0, max = 1000))]
    pub protein: i32,
    #[validate(range(min = 0, max = 1000))]
    pub carbs: i32,
    #[validate(range(min = 0, max = 1000))]
    pub fats: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDietPlanRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddDietPlanMealRequest {
    pub meal_id: Uuid,
    pub meal_type: MealType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    pub total_users: i64,
    pub daily_active_users: i64,
    pub weekly_active_users: i64,
    pub monthly_active_users: i64,
}

// ============================================================================
// AI Types
// ============================================================================

/// Input for plan generation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratePlanRequest {
    #[serde(flatten)]
    pub biometrics: BiometricInput,
    pub goal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeExercise {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyChallenge {
    pub exercises: Vec<ChallengeExercise>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTip {
    pub tip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 4000, message = "Message is required"))]
    pub message: String,
    #[serde(default)]
    pub chat_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub chat_id: Uuid,
}
