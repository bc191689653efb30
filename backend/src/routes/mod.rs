//! Route definitions for the FitTrack API
//!
//! This module organizes all API routes and applies middleware.

use crate::config::CorsConfig;
use crate::state::AppState;
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;

mod admin;
mod ai;
mod auth;
mod diet;
mod energy;
mod health;
mod messages;
mod profile;
mod staff;
mod workouts;

#[cfg(test)]
mod ai_tests;
#[cfg(test)]
mod energy_tests;

pub use admin::admin_routes;
pub use ai::ai_routes;
pub use auth::auth_routes;
pub use diet::diet_routes;
pub use energy::energy_routes;
pub use messages::message_routes;
pub use profile::profile_routes;
pub use staff::staff_routes;
pub use workouts::workout_routes;

/// Create the main application router with all middleware
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config().cors);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .route("/metrics", get(health::metrics))
        .nest("/api/v1", api_routes())
        // Apply middleware layers
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(cors)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the configured frontend origin, or any origin for "*"
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if config.allowed_origin == "*" {
        return layer.allow_origin(Any);
    }

    match HeaderValue::from_str(&config.allowed_origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            warn!(origin = %config.allowed_origin, "Invalid CORS origin, allowing any");
            layer.allow_origin(Any)
        }
    }
}

/// API v1 routes
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { "FitTrack API v1" }))
        .nest("/auth", auth::auth_routes())
        .nest("/profile", profile::profile_routes())
        .nest("/energy", energy::energy_routes())
        .nest("/workouts", workouts::workout_routes())
        .nest("/diet", diet::diet_routes())
        .nest("/messages", messages::message_routes())
        .nest("/staff", staff::staff_routes())
        .nest("/admin", admin::admin_routes())
        .nest("/ai", ai::ai_routes())
}
