//! User profile API routes

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::{EnergyService, ProfileService};
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use fittrack_shared::types::{EnergyResponse, ProfileResponse, UpdateProfileRequest};

/// Create profile routes
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_profile).put(update_profile))
        .route("/energy", get(get_energy))
}

/// GET /api/v1/profile - Profile, assigned plans and today's exercises
async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = ProfileService::get_profile(state.db(), auth.user_id).await?;
    Ok(Json(profile))
}

/// PUT /api/v1/profile - Partial update; omitted fields are unchanged
async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = ProfileService::update_profile(state.db(), auth.user_id, req).await?;
    Ok(Json(profile))
}

/// GET /api/v1/profile/energy - Energy estimate of the stored profile
async fn get_energy(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<EnergyResponse>> {
    let energy = EnergyService::for_user(state.db(), auth.user_id).await?;
    Ok(Json(energy))
}
