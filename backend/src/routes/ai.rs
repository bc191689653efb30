//! Generative AI routes

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::AiService;
use crate::state::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use fittrack_shared::types::{
    ChatRequest, ChatResponse, DailyChallenge, DailyTip, GeneratePlanRequest, GeneratedDietPlan,
    GeneratedWorkoutEnvelope,
};

pub fn ai_routes() -> Router<AppState> {
    Router::new()
        .route("/workout", post(generate_workout))
        .route("/diet", post(generate_diet))
        .route("/daily-challenge", get(daily_challenge))
        .route("/daily-tip", get(daily_tip))
        .route("/chat", post(chat))
}

/// POST /api/v1/ai/workout
async fn generate_workout(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(req): Json<GeneratePlanRequest>,
) -> ApiResult<Json<GeneratedWorkoutEnvelope>> {
    let plan = AiService::generate_workout(state.ai.as_ref(), &req, Utc::now().date_naive()).await?;
    Ok(Json(plan))
}

/// POST /api/v1/ai/diet
async fn generate_diet(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(req): Json<GeneratePlanRequest>,
) -> ApiResult<Json<GeneratedDietPlan>> {
    let plan = AiService::generate_diet(state.ai.as_ref(), &req, Utc::now().date_naive()).await?;
    Ok(Json(plan))
}

/// GET /api/v1/ai/daily-challenge
async fn daily_challenge(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> ApiResult<Json<DailyChallenge>> {
    Ok(Json(AiService::daily_challenge(state.ai.as_ref()).await?))
}

/// GET /api/v1/ai/daily-tip
async fn daily_tip(State(state): State<AppState>, _auth: AuthUser) -> Json<DailyTip> {
    Json(AiService::daily_tip(state.ai.as_ref()).await)
}

/// POST /api/v1/ai/chat
async fn chat(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let response = AiService::chat(state.db(), state.ai.as_ref(), auth.user_id, req).await?;
    Ok(Json(response))
}
