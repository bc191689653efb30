//! Authentication routes
//!
//! Provides endpoints for registration, login, token refresh and password
//! recovery.
//!
//! # Performance Optimizations
//!
//! - Uses pre-computed JWT keys from AppState (no per-request allocation)
//! - Password hashing runs on blocking thread pool (doesn't block async runtime)

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;
use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use fittrack_shared::types::{
    AccountResponse, AckResponse, AuthTokens, ForgotPasswordRequest, LoginRequest,
    RegisterRequest, ResetPasswordRequest,
};
use serde::Deserialize;
use std::net::SocketAddr;

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh_token))
        .route("/me", get(me))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}

/// Client address for rate limiting: first `X-Forwarded-For` hop, then the
/// socket peer, then "unknown".
pub(crate) fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Register a new user
///
/// POST /api/v1/auth/register
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthTokens>)> {
    let tokens = UserService::register(&state.db, state.jwt(), req).await?;
    Ok((StatusCode::CREATED, Json(tokens)))
}

/// Login with email and password
///
/// POST /api/v1/auth/login
///
/// Repeated failures from one address for one email lock that pair out
/// with 429 and a `Retry-After` header.
async fn login(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthTokens>> {
    let ip = client_ip(&headers, peer.map(|ConnectInfo(addr)| addr));
    let tokens =
        UserService::login(&state.db, state.jwt(), &state.login_limiter, &ip, req).await?;
    Ok(Json(tokens))
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Refresh access token
///
/// POST /api/v1/auth/refresh
async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> ApiResult<Json<AuthTokens>> {
    let tokens = UserService::refresh_token(&state.db, state.jwt(), &req.refresh_token).await?;
    Ok(Json(tokens))
}

/// Current account (requires authentication)
///
/// GET /api/v1/auth/me
async fn me(State(state): State<AppState>, auth_user: AuthUser) -> ApiResult<Json<AccountResponse>> {
    let account = UserService::me(&state.db, auth_user.user_id).await?;
    Ok(Json(account))
}

/// POST /api/v1/auth/forgot-password
async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<AckResponse>> {
    UserService::forgot_password(&state, req).await?;
    Ok(Json(AckResponse::new(
        "If that email is registered, a reset link is on its way",
    )))
}

/// POST /api/v1/auth/reset-password
async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Json<AckResponse>> {
    UserService::reset_password(&state, req).await?;
    Ok(Json(AckResponse::new("Password has been reset")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        let peer: SocketAddr = "10.0.0.2:5000".parse().unwrap();
        assert_eq!(client_ip(&headers, Some(peer)), "203.0.113.7");
    }

    #[test]
    fn test_client_ip_falls_back_to_peer_then_unknown() {
        let headers = HeaderMap::new();
        let peer: SocketAddr = "192.0.2.4:443".parse().unwrap();
        assert_eq!(client_ip(&headers, Some(peer)), "192.0.2.4");
        assert_eq!(client_ip(&headers, None), "unknown");
    }
}
