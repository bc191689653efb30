//! Admin routes: moderators, message removal and catalogue authoring

use crate::auth::AdminUser;
use crate::error::ApiResult;
use crate::services::{AdminService, DietService, MessageService, WorkoutService};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use fittrack_shared::types::{
    AddDietPlanMealRequest, CreateDietPlanRequest, CreateExerciseRequest, CreateMealRequest,
    CreateWorkoutPlanRequest, DietPlanResponse, ExerciseResponse, MealResponse,
    PlanExerciseInput, PlanExercisesRequest, PlanSummary, PromoteModeratorRequest,
    StaffMemberResponse, WorkoutPlanResponse, WorkoutPlanSummary,
};
use uuid::Uuid;

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/moderators", get(list_moderators).post(add_moderator))
        .route("/moderators/:email", delete(remove_moderator))
        .route("/messages/:id", delete(delete_message))
        .route("/exercises", get(list_exercises).post(create_exercise))
        .route("/exercises/:id", delete(delete_exercise))
        .route("/workout-plans", get(list_workout_plans).post(create_workout_plan))
        .route(
            "/workout-plans/:id/exercises",
            get(get_plan_exercises)
                .post(add_plan_exercise)
                .put(replace_plan_exercises),
        )
        .route(
            "/workout-plans/:id/exercises/:exercise_id/:day",
            delete(remove_plan_exercise),
        )
        .route("/meals", get(list_meals).post(create_meal))
        .route("/meals/:id", delete(delete_meal))
        .route("/diet-plans", get(list_diet_plans).post(create_diet_plan))
        .route("/diet-plans/:id", delete(delete_diet_plan))
        .route("/diet-plans/:id/meals", get(get_plan_meals).post(add_plan_meal))
        .route("/diet-plans/:id/meals/:meal_id", delete(remove_plan_meal))
}

// ============================================================================
// Moderators
// ============================================================================

async fn list_moderators(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<StaffMemberResponse>>> {
    Ok(Json(AdminService::list_moderators(state.db()).await?))
}

async fn add_moderator(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<PromoteModeratorRequest>,
) -> ApiResult<(StatusCode, Json<StaffMemberResponse>)> {
    let member = AdminService::promote_moderator(state.db(), &req.email).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

async fn remove_moderator(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(email): Path<String>,
) -> ApiResult<StatusCode> {
    AdminService::remove_moderator(state.db(), &email).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_message(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    MessageService::delete(state.db(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Exercises and workout plans
// ============================================================================

async fn list_exercises(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<ExerciseResponse>>> {
    Ok(Json(AdminService::list_exercises(state.db()).await?))
}

async fn create_exercise(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<CreateExerciseRequest>,
) -> ApiResult<(StatusCode, Json<ExerciseResponse>)> {
    let exercise = AdminService::create_exercise(state.db(), req).await?;
    Ok((StatusCode::CREATED, Json(exercise)))
}

async fn delete_exercise(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    AdminService::delete_exercise(state.db(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_workout_plans(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<WorkoutPlanSummary>>> {
    Ok(Json(AdminService::list_workout_plans(state.db()).await?))
}

async fn create_workout_plan(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<CreateWorkoutPlanRequest>,
) -> ApiResult<(StatusCode, Json<WorkoutPlanSummary>)> {
    let plan = AdminService::create_workout_plan(state.db(), req).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

async fn get_plan_exercises(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<WorkoutPlanResponse>> {
    Ok(Json(WorkoutService::plan_details(state.db(), id).await?))
}

async fn add_plan_exercise(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<PlanExerciseInput>,
) -> ApiResult<Json<WorkoutPlanResponse>> {
    Ok(Json(AdminService::add_plan_exercise(state.db(), id, req).await?))
}

async fn replace_plan_exercises(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<PlanExercisesRequest>,
) -> ApiResult<Json<WorkoutPlanResponse>> {
    Ok(Json(
        AdminService::replace_plan_exercises(state.db(), id, req.exercises).await?,
    ))
}

async fn remove_plan_exercise(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path((id, exercise_id, day)): Path<(Uuid, Uuid, i32)>,
) -> ApiResult<StatusCode> {
    AdminService::remove_plan_exercise(state.db(), id, exercise_id, day).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Meals and diet plans
// ============================================================================

async fn list_meals(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<MealResponse>>> {
    Ok(Json(AdminService::list_meals(state.db()).await?))
}

async fn create_meal(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<CreateMealRequest>,
) -> ApiResult<(StatusCode, Json<MealResponse>)> {
    let meal = AdminService::create_meal(state.db(), req).await?;
    Ok((StatusCode::CREATED, Json(meal)))
}

async fn delete_meal(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    AdminService::delete_meal(state.db(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_diet_plans(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<PlanSummary>>> {
    Ok(Json(AdminService::list_diet_plans(state.db()).await?))
}

async fn create_diet_plan(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<CreateDietPlanRequest>,
) -> ApiResult<(StatusCode, Json<PlanSummary>)> {
    let plan = AdminService::create_diet_plan(state.db(), req).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

async fn delete_diet_plan(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    AdminService::delete_diet_plan(state.db(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_plan_meals(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DietPlanResponse>> {
    Ok(Json(DietService::plan_details(state.db(), id).await?))
}

async fn add_plan_meal(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AddDietPlanMealRequest>,
) -> ApiResult<Json<DietPlanResponse>> {
    Ok(Json(AdminService::add_plan_meal(state.db(), id, req).await?))
}

async fn remove_plan_meal(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path((id, meal_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    AdminService::remove_plan_meal(state.db(), id, meal_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
