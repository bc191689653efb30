//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! # Design Principles
//!
//! 1. **Pre-compute expensive resources**: JWT keys, DB pools, HTTP clients are created once
//! 2. **Cheap cloning**: All fields use Arc or are already Clone-cheap
//! 3. **Injected collaborators**: the attempt store, text generator and mailer are
//!    trait objects so tests and deployments can swap them

use crate::ai::{GeminiClient, TextGenerator};
use crate::auth::{AttemptStore, JwtService, LoginLimiter, MemoryAttemptStore};
use crate::config::AppConfig;
use crate::email::{LogMailer, Mailer};
use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state
///
/// # Performance
///
/// - `db`: PgPool is internally Arc'd, cloning is O(1)
/// - `config`: Wrapped in Arc, cloning is O(1)
/// - `jwt`: Pre-computed keys wrapped in Arc, cloning is O(1)
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Pre-initialized JWT service with cached keys
    pub jwt: JwtService,
    pub login_limiter: LoginLimiter,
    pub ai: Arc<dyn TextGenerator>,
    pub mailer: Arc<dyn Mailer>,
    /// Present when the Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new application state with in-process defaults: an in-memory
    /// login attempt store, the Gemini client from config and a log-only mailer.
    ///
    /// # Note
    /// This pre-computes JWT keys from the config secret.
    pub fn new(db: PgPool, config: AppConfig) -> Result<Self> {
        let jwt = JwtService::new(
            &config.jwt.secret,
            config.jwt.access_token_expiry_secs,
            config.jwt.refresh_token_expiry_secs,
        );
        let login_limiter =
            LoginLimiter::new(Arc::new(MemoryAttemptStore::new()), &config.login_limit);
        let ai = Arc::new(GeminiClient::new(&config.ai)?);

        Ok(Self {
            db,
            config: Arc::new(config),
            jwt,
            login_limiter,
            ai,
            mailer: Arc::new(LogMailer),
            metrics: None,
        })
    }

    pub fn with_attempt_store(mut self, store: Arc<dyn AttemptStore>) -> Self {
        self.login_limiter = LoginLimiter::new(store, &self.config.login_limit);
        self
    }

    pub fn with_text_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.ai = generator;
        self
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = mailer;
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Get a reference to the database pool
    #[inline]
    pub fn db(&self) -> &PgPool {
        &self.db
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a reference to the JWT service
    #[inline]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }
}
