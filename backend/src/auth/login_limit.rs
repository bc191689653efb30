//! Login attempt limiting
//!
//! Failed logins are counted per `client-ip:normalized-email` key in an
//! injected TTL store. Once the count reaches the configured maximum the key
//! is locked until its TTL runs out; a successful login clears it.
//!
//! Redis is the production store. When Redis is unavailable the in-process
//! [`MemoryAttemptStore`] keeps the limiter working on a single node.

use anyhow::Result;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::warn;

use crate::config::LoginLimitConfig;
use crate::error::ApiError;

/// Failure count and remaining lifetime for one key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptState {
    pub failures: u32,
    pub ttl_secs: u64,
}

/// TTL-keyed counter store
#[async_trait]
pub trait AttemptStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<AttemptState>>;

    /// Increment the counter and re-arm its expiry; returns the new count
    async fn increment(&self, key: &str, ttl_secs: u64) -> Result<u32>;

    async fn clear(&self, key: &str) -> Result<()>;
}

// ============================================================================
// Redis store
// ============================================================================

pub struct RedisAttemptStore {
    conn: ConnectionManager,
}

impl RedisAttemptStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    fn redis_key(key: &str) -> String {
        format!("fittrack:login_attempts:{}", key)
    }
}

#[async_trait]
impl AttemptStore for RedisAttemptStore {
    async fn get(&self, key: &str) -> Result<Option<AttemptState>> {
        let key = Self::redis_key(key);
        let mut conn = self.conn.clone();
        let (failures, ttl): (Option<u32>, i64) = redis::pipe()
            .cmd("GET")
            .arg(&key)
            .cmd("TTL")
            .arg(&key)
            .query_async(&mut conn)
            .await?;

        Ok(failures.map(|failures| AttemptState {
            failures,
            ttl_secs: ttl.max(0) as u64,
        }))
    }

    async fn increment(&self, key: &str, ttl_secs: u64) -> Result<u32> {
        let key = Self::redis_key(key);
        let mut conn = self.conn.clone();
        let (count,): (u32,) = redis::pipe()
            .atomic()
            .cmd("INCR")
            .arg(&key)
            .cmd("EXPIRE")
            .arg(&key)
            .arg(ttl_secs)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(count)
    }

    async fn clear(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        redis::cmd("DEL")
            .arg(Self::redis_key(key))
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Single-process fallback store
#[derive(Default)]
pub struct MemoryAttemptStore {
    entries: Mutex<HashMap<String, (u32, Instant)>>,
}

impl MemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, (u32, Instant)>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("attempt store mutex poisoned"))
    }
}

#[async_trait]
impl AttemptStore for MemoryAttemptStore {
    async fn get(&self, key: &str) -> Result<Option<AttemptState>> {
        let mut entries = self.lock()?;
        let now = Instant::now();
        match entries.get(key) {
            Some(&(failures, expires_at)) if expires_at > now => Ok(Some(AttemptState {
                failures,
                ttl_secs: (expires_at - now).as_secs(),
            })),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn increment(&self, key: &str, ttl_secs: u64) -> Result<u32> {
        let mut entries = self.lock()?;
        let now = Instant::now();
        let expires_at = now + Duration::from_secs(ttl_secs);
        // Keys that are never read again would otherwise stay forever.
        entries.retain(|_, (_, exp)| *exp > now);
        let entry = entries.entry(key.to_string()).or_insert((0, expires_at));
        entry.0 += 1;
        entry.1 = expires_at;
        Ok(entry.0)
    }

    async fn clear(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

// ============================================================================
// Limiter
// ============================================================================

/// Login limiter over an [`AttemptStore`]
///
/// Store failures are logged and treated as "no recorded attempts" so an
/// outage of the store never blocks logins.
#[derive(Clone)]
pub struct LoginLimiter {
    store: Arc<dyn AttemptStore>,
    max_attempts: u32,
    lockout_secs: u64,
}

impl LoginLimiter {
    pub fn new(store: Arc<dyn AttemptStore>, config: &LoginLimitConfig) -> Self {
        Self {
            store,
            max_attempts: config.max_attempts.max(1),
            lockout_secs: config.lockout_secs,
        }
    }

    /// Key for a client address and email
    pub fn key(client_ip: &str, email: &str) -> String {
        format!("{}:{}", client_ip, email.trim().to_lowercase())
    }

    /// Reject with 429 while the key is locked
    pub async fn check(&self, key: &str) -> Result<(), ApiError> {
        match self.store.get(key).await {
            Ok(Some(state)) if state.failures >= self.max_attempts => {
                Err(ApiError::TooManyRequests {
                    retry_after_secs: state.ttl_secs.max(1),
                })
            }
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(error = %e, "Login attempt store unavailable");
                Ok(())
            }
        }
    }

    /// Record a failed attempt. Returns 429 when this failure triggers the lock.
    pub async fn record_failure(&self, key: &str) -> Result<(), ApiError> {
        match self.store.increment(key, self.lockout_secs).await {
            Ok(count) if count >= self.max_attempts => {
                metrics::counter!(crate::telemetry::LOGIN_LOCKOUTS).increment(1);
                Err(ApiError::TooManyRequests {
                    retry_after_secs: self.lockout_secs,
                })
            }
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(error = %e, "Failed to record login attempt");
                Ok(())
            }
        }
    }

    /// Clear the key after a successful login
    pub async fn reset(&self, key: &str) {
        if let Err(e) = self.store.clear(key).await {
            warn!(error = %e, "Failed to clear login attempts");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_attempts: u32) -> LoginLimiter {
        LoginLimiter::new(
            Arc::new(MemoryAttemptStore::new()),
            &LoginLimitConfig {
                max_attempts,
                lockout_secs: 900,
            },
        )
    }

    #[test]
    fn test_key_normalizes_email() {
        assert_eq!(
            LoginLimiter::key("10.0.0.1", "  Runner@Example.COM "),
            "10.0.0.1:runner@example.com"
        );
    }

    #[tokio::test]
    async fn test_locks_after_max_failures() {
        let limiter = limiter(5);
        let key = LoginLimiter::key("127.0.0.1", "a@b.co");

        for _ in 0..4 {
            limiter.check(&key).await.unwrap();
            limiter.record_failure(&key).await.unwrap();
        }

        let err = limiter.record_failure(&key).await.unwrap_err();
        assert!(matches!(err, ApiError::TooManyRequests { retry_after_secs: 900 }));

        let err = limiter.check(&key).await.unwrap_err();
        match err {
            ApiError::TooManyRequests { retry_after_secs } => assert!(retry_after_secs <= 900),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_reset_clears_failures() {
        let limiter = limiter(2);
        let key = LoginLimiter::key("127.0.0.1", "a@b.co");

        limiter.record_failure(&key).await.unwrap();
        limiter.reset(&key).await;
        limiter.record_failure(&key).await.unwrap();
        limiter.check(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = limiter(1);
        let locked = LoginLimiter::key("1.1.1.1", "a@b.co");
        let other = LoginLimiter::key("2.2.2.2", "a@b.co");

        assert!(limiter.record_failure(&locked).await.is_err());
        assert!(limiter.check(&locked).await.is_err());
        limiter.check(&other).await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_store_expires_entries() {
        let store = MemoryAttemptStore::new();
        store.increment("k", 0).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
        assert_eq!(store.increment("k", 60).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_drops_expired_keys_on_write() {
        let store = MemoryAttemptStore::new();
        for n in 0..50 {
            store.increment(&format!("10.0.0.1:user{n}@example.com"), 0).await.unwrap();
        }
        store.increment("10.0.0.1:live@example.com", 60).await.unwrap();

        let entries = store.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries.contains_key("10.0.0.1:live@example.com"));
    }
}
