//! Workout plan and lift log routes

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::WorkoutService;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use fittrack_shared::types::{
    ExerciseLogResponse, GeneratedWorkoutEnvelope, LogExerciseRequest, SelectPlanRequest,
    TodayStatsResponse, WorkoutPlanResponse, WorkoutPlanSummary,
};
use serde::Deserialize;

pub fn workout_routes() -> Router<AppState> {
    Router::new()
        .route("/plan", get(get_plan))
        .route("/available", get(available_plans))
        .route("/select", post(select_plan))
        .route("/save", post(save_plan))
        .route("/logs", post(log_exercise))
        .route("/logs/today", get(today_logs))
        .route("/logs/recent", get(recent_logs))
        .route("/today", get(today_stats))
}

#[derive(Debug, Deserialize)]
struct RecentLogsQuery {
    limit: Option<i64>,
}

/// GET /api/v1/workouts/plan
async fn get_plan(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<WorkoutPlanResponse>> {
    Ok(Json(WorkoutService::assigned_plan(state.db(), auth.user_id).await?))
}

/// GET /api/v1/workouts/available
async fn available_plans(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<WorkoutPlanSummary>>> {
    Ok(Json(WorkoutService::available_plans(state.db(), auth.user_id).await?))
}

/// POST /api/v1/workouts/select
async fn select_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SelectPlanRequest>,
) -> ApiResult<Json<WorkoutPlanResponse>> {
    let plan = WorkoutService::select_plan(state.db(), auth.user_id, req.plan_id).await?;
    Ok(Json(plan))
}

/// POST /api/v1/workouts/save - Persist an AI-generated plan and assign it
async fn save_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<GeneratedWorkoutEnvelope>,
) -> ApiResult<(StatusCode, Json<WorkoutPlanResponse>)> {
    let plan = WorkoutService::save_generated(state.db(), auth.user_id, req.workout_plan).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// POST /api/v1/workouts/logs
async fn log_exercise(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<LogExerciseRequest>,
) -> ApiResult<(StatusCode, Json<ExerciseLogResponse>)> {
    let log = WorkoutService::log_exercise(state.db(), auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

/// GET /api/v1/workouts/logs/today
async fn today_logs(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<ExerciseLogResponse>>> {
    Ok(Json(WorkoutService::today_logs(state.db(), auth.user_id).await?))
}

/// GET /api/v1/workouts/logs/recent?limit=N (at most 100)
async fn recent_logs(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<RecentLogsQuery>,
) -> ApiResult<Json<Vec<ExerciseLogResponse>>> {
    let logs = WorkoutService::recent_logs(state.db(), auth.user_id, query.limit).await?;
    Ok(Json(logs))
}

/// GET /api/v1/workouts/today
async fn today_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<TodayStatsResponse>> {
    Ok(Json(WorkoutService::today_stats(state.db(), auth.user_id).await?))
}
