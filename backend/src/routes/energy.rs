//! Ad-hoc energy estimates

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::EnergyService;
use crate::state::AppState;
use axum::{routing::post, Json, Router};
use chrono::Utc;
use fittrack_shared::types::{EnergyRequest, EnergyResponse};

pub fn energy_routes() -> Router<AppState> {
    Router::new().route("/estimate", post(estimate))
}

/// POST /api/v1/energy/estimate
async fn estimate(_auth: AuthUser, Json(req): Json<EnergyRequest>) -> ApiResult<Json<EnergyResponse>> {
    let response = EnergyService::estimate(&req, Utc::now().date_naive())?;
    Ok(Json(response))
}
