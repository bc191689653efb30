//! Diet plan routes

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::DietService;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use fittrack_shared::types::{DietMatchQuery, DietPlanResponse, GeneratedDietPlan, SelectPlanRequest};
use fittrack_shared::PlanMatchResponse;

pub fn diet_routes() -> Router<AppState> {
    Router::new()
        .route("/plan", get(get_plan))
        .route("/matches", get(matches))
        .route("/select", post(select_plan))
        .route("/save", post(save_plan))
}

/// GET /api/v1/diet/plan
async fn get_plan(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<DietPlanResponse>> {
    Ok(Json(DietService::assigned_plan(state.db(), auth.user_id).await?))
}

/// GET /api/v1/diet/matches?goal=lose_fat
///
/// Ranked plans near the calorie target of the stored profile. An empty
/// result still answers 200 with a warning and a suggested range.
async fn matches(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<DietMatchQuery>,
) -> ApiResult<Json<PlanMatchResponse>> {
    let response = DietService::matches(state.db(), auth.user_id, query.goal.as_deref()).await?;
    Ok(Json(response))
}

/// POST /api/v1/diet/select
async fn select_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SelectPlanRequest>,
) -> ApiResult<Json<DietPlanResponse>> {
    Ok(Json(DietService::select_plan(state.db(), auth.user_id, req.plan_id).await?))
}

/// POST /api/v1/diet/save - Persist an AI-generated plan and assign it
async fn save_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<GeneratedDietPlan>,
) -> ApiResult<(StatusCode, Json<DietPlanResponse>)> {
    let plan = DietService::save_generated(state.db(), auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}
