//! Password reset token repository

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ResetTokenRecord {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

pub struct ResetTokenRepository;

impl ResetTokenRepository {
    /// Store a token, discarding any earlier ones for the same user
    pub async fn replace_for_user(
        pool: &PgPool,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO password_reset_tokens (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Remove and return a token that has not expired as of `now`.
    /// Expired or unknown tokens yield `None`; either way the token is gone.
    pub async fn consume(
        pool: &PgPool,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ResetTokenRecord>> {
        let record = sqlx::query_as::<_, ResetTokenRecord>(
            r#"
            DELETE FROM password_reset_tokens
            WHERE token = $1
            RETURNING *
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(record.filter(|r| r.expires_at > now))
    }
}
