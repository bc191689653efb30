//! User message submission

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::MessageService;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use fittrack_shared::types::{CreateMessageRequest, MessageResponse};

pub fn message_routes() -> Router<AppState> {
    Router::new().route("/", post(submit))
}

/// POST /api/v1/messages
async fn submit(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateMessageRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let message = MessageService::submit(state.db(), auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(message)))
}
