//! Moderator triage routes (moderators and admins)

use crate::auth::StaffUser;
use crate::error::ApiResult;
use crate::services::{AdminService, MessageService};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Json, Router,
};
use fittrack_shared::types::{
    AnalyticsResponse, ExerciseResponse, MessageResponse, UpdateMessageStatusRequest,
};
use uuid::Uuid;

pub fn staff_routes() -> Router<AppState> {
    Router::new()
        .route("/messages", get(list_messages))
        .route("/messages/:id", get(get_message))
        .route("/messages/:id/status", patch(update_status))
        .route("/exercises", get(list_exercises))
        .route("/analytics", get(analytics))
}

async fn list_messages(
    State(state): State<AppState>,
    _staff: StaffUser,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    Ok(Json(MessageService::list(state.db()).await?))
}

async fn get_message(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    Ok(Json(MessageService::get(state.db(), id).await?))
}

/// PATCH /api/v1/staff/messages/:id/status - defaults to `seen`
async fn update_status(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateMessageStatusRequest>,
) -> ApiResult<Json<MessageResponse>> {
    Ok(Json(MessageService::update_status(state.db(), id, req).await?))
}

async fn list_exercises(
    State(state): State<AppState>,
    _staff: StaffUser,
) -> ApiResult<Json<Vec<ExerciseResponse>>> {
    Ok(Json(AdminService::list_exercises(state.db()).await?))
}

async fn analytics(
    State(state): State<AppState>,
    _staff: StaffUser,
) -> ApiResult<Json<AnalyticsResponse>> {
    Ok(Json(AdminService::analytics(state.db()).await?))
}
