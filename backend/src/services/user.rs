//! User service for authentication and account recovery
//!
//! # Performance Optimizations
//!
//! - Password hashing/verification runs on blocking thread pool
//! - JWT service is passed by reference (pre-computed keys)
//! - Database queries use connection pooling

use crate::auth::{JwtService, LoginLimiter, PasswordService, TokenSubject};
use crate::email::{password_changed_email, password_reset_email};
use crate::error::ApiError;
use crate::repositories::{ResetTokenRepository, UserRecord, UserRepository};
use crate::state::AppState;
use crate::telemetry;
use chrono::{Duration, Utc};
use fittrack_shared::types::{
    AccountResponse, AuthTokens, ForgotPasswordRequest, LoginRequest, RegisterRequest,
    ResetPasswordRequest,
};
use fittrack_shared::validation::{validate_email, validate_password};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

/// Reset links stay valid for one hour
const RESET_TOKEN_TTL_MINUTES: i64 = 60;

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn issue_tokens(jwt_service: &JwtService, user: &UserRecord) -> Result<AuthTokens, ApiError> {
    let role = user.role();
    let subject = TokenSubject {
        user_id: user.id,
        email: &user.email,
        role,
    };

    // Generate tokens (uses pre-computed keys - fast)
    let access_token = jwt_service
        .generate_access_token(&subject)
        .map_err(ApiError::Internal)?;
    let refresh_token = jwt_service
        .generate_refresh_token(&subject)
        .map_err(ApiError::Internal)?;

    Ok(AuthTokens {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: jwt_service.access_token_expiry_secs(),
        role,
    })
}

/// User service for authentication operations
pub struct UserService;

impl UserService {
    /// Register a new user
    ///
    /// # Performance
    /// Password hashing is offloaded to blocking thread pool via `spawn_blocking`.
    pub async fn register(
        pool: &PgPool,
        jwt_service: &JwtService,
        req: RegisterRequest,
    ) -> Result<AuthTokens, ApiError> {
        req.validate()?;
        let email = normalize_email(&req.email);
        validate_email(&email).map_err(ApiError::Validation)?;
        validate_password(&req.password).map_err(ApiError::Validation)?;

        if UserRepository::email_exists(pool, &email)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }

        // Hash password on blocking thread pool (CPU-intensive)
        let password_hash = PasswordService::hash_async(req.password)
            .await
            .map_err(ApiError::Internal)?;

        let user = UserRepository::create(
            pool,
            &email,
            &password_hash,
            req.first_name.as_deref(),
            req.last_name.as_deref(),
        )
        .await
        .map_err(ApiError::Internal)?;

        info!(user_id = %user.id, "User registered");
        issue_tokens(jwt_service, &user)
    }

    /// Login with email and password.
    ///
    /// Failures count against the `(client_ip, email)` key; once the limit
    /// is reached every attempt is refused until the lockout expires.
    pub async fn login(
        pool: &PgPool,
        jwt_service: &JwtService,
        limiter: &LoginLimiter,
        client_ip: &str,
        req: LoginRequest,
    ) -> Result<AuthTokens, ApiError> {
        let email = normalize_email(&req.email);
        let key = LoginLimiter::key(client_ip, &email);

        if let Err(e) = limiter.check(&key).await {
            metrics::counter!(telemetry::LOGINS, "outcome" => "locked").increment(1);
            return Err(e);
        }

        let user = UserRepository::find_by_email(pool, &email)
            .await
            .map_err(ApiError::Internal)?;

        let verified = match &user {
            Some(user) => PasswordService::verify_async(req.password.clone(), user.password_hash.clone())
                .await
                .map_err(ApiError::Internal)?,
            None => false,
        };

        let user = match user {
            Some(user) if verified => user,
            _ => {
                metrics::counter!(telemetry::LOGINS, "outcome" => "failure").increment(1);
                limiter.record_failure(&key).await?;
                return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
            }
        };

        limiter.reset(&key).await;
        metrics::counter!(telemetry::LOGINS, "outcome" => "success").increment(1);

        if PasswordService::is_legacy_hash(&user.password_hash) {
            Self::upgrade_legacy_hash(pool, user.id, req.password).await;
        }

        info!(user_id = %user.id, "User logged in");
        issue_tokens(jwt_service, &user)
    }

    async fn upgrade_legacy_hash(pool: &PgPool, user_id: Uuid, password: String) {
        let result = async {
            let hash = PasswordService::hash_async(password).await?;
            UserRepository::update_password(pool, user_id, &hash).await
        }
        .await;

        match result {
            Ok(()) => info!(user_id = %user_id, "Upgraded legacy password hash"),
            Err(e) => warn!(user_id = %user_id, error = %e, "Failed to upgrade legacy password hash"),
        }
    }

    /// Refresh access token using refresh token
    pub async fn refresh_token(
        pool: &PgPool,
        jwt_service: &JwtService,
        refresh_token: &str,
    ) -> Result<AuthTokens, ApiError> {
        let claims = jwt_service
            .validate_refresh_token(refresh_token)
            .map_err(|e| ApiError::Unauthorized(format!("Invalid refresh token: {}", e)))?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid user ID in token".to_string()))?;

        // Reload so role changes since the last login take effect
        let user = UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

        issue_tokens(jwt_service, &user)
    }

    /// Account summary for the authenticated user
    pub async fn me(pool: &PgPool, user_id: Uuid) -> Result<AccountResponse, ApiError> {
        let user = UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(AccountResponse {
            id: user.id.to_string(),
            role: user.role(),
            email: user.email,
            created_at: user.created_at,
        })
    }

    /// Issue a reset token and email the link.
    ///
    /// Unknown addresses succeed silently so the endpoint cannot be used to
    /// probe which emails have accounts.
    pub async fn forgot_password(
        state: &AppState,
        req: ForgotPasswordRequest,
    ) -> Result<(), ApiError> {
        let email = normalize_email(&req.email);
        if email.is_empty() {
            return Err(ApiError::InvalidField {
                field: "email".to_string(),
                message: "Email is required".to_string(),
            });
        }

        let Some(user) = UserRepository::find_by_email(state.db(), &email)
            .await
            .map_err(ApiError::Internal)?
        else {
            info!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = PasswordService::generate_reset_token();
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);
        ResetTokenRepository::replace_for_user(state.db(), user.id, &token, expires_at)
            .await
            .map_err(ApiError::Internal)?;

        let message = password_reset_email(
            &user.email,
            user.first_name.as_deref(),
            &state.config().email.frontend_url,
            &token,
        );
        state.mailer.send(message).await.map_err(ApiError::Internal)?;

        info!(user_id = %user.id, "Password reset email sent");
        Ok(())
    }

    /// Consume a reset token and set the new password
    pub async fn reset_password(
        state: &AppState,
        req: ResetPasswordRequest,
    ) -> Result<(), ApiError> {
        req.validate()?;
        validate_password(&req.new_password).map_err(ApiError::Validation)?;

        let record = ResetTokenRepository::consume(state.db(), &req.token, Utc::now())
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::BadRequest("Invalid or expired reset token".to_string()))?;

        let password_hash = PasswordService::hash_async(req.new_password)
            .await
            .map_err(ApiError::Internal)?;
        UserRepository::update_password(state.db(), record.user_id, &password_hash)
            .await
            .map_err(ApiError::Internal)?;

        info!(user_id = %record.user_id, "Password reset completed");

        if let Some(user) = UserRepository::find_by_id(state.db(), record.user_id)
            .await
            .map_err(ApiError::Internal)?
        {
            let notice = password_changed_email(&user.email, user.first_name.as_deref());
            if let Err(e) = state.mailer.send(notice).await {
                warn!(user_id = %user.id, error = %e, "Failed to send password change notice");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn user(role: &str) -> UserRecord {
        let now = Utc::now();
        UserRecord {
            id: Uuid::new_v4(),
            email: "lifter@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: role.to_string(),
            first_name: None,
            last_name: None,
            gender: None,
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1),
            weight_kg: None,
            height_cm: None,
            number_of_training_days: None,
            fitness_goal: None,
            workout_plan_id: None,
            diet_plan_id: None,
            daily_counter: 0,
            counter_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Runner@Example.COM "), "runner@example.com");
    }

    #[test]
    fn test_issued_tokens_carry_role() {
        let jwt = JwtService::new("unit-test-secret", 900, 3600);
        let record = user("admin");
        let tokens = issue_tokens(&jwt, &record).unwrap();

        assert_eq!(tokens.role, fittrack_shared::Role::Admin);
        assert_eq!(tokens.token_type, "Bearer");
        assert_eq!(tokens.expires_in, 900);

        let claims = jwt.validate_access_token(&tokens.access_token).unwrap();
        assert_eq!(claims.sub, record.id.to_string());
        assert_eq!(claims.role, fittrack_shared::Role::Admin);
        assert!(jwt.validate_refresh_token(&tokens.refresh_token).is_ok());
    }
}
