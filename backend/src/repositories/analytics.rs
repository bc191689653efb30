//! Usage analytics queries

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct AnalyticsRepository;

impl AnalyticsRepository {
    /// Distinct users with at least one lift logged at or after `since`
    pub async fn active_users_since(pool: &PgPool, since: DateTime<Utc>) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(DISTINCT user_id)
            FROM exercise_weight_logs
            WHERE logged_at >= $1
            "#,
        )
        .bind(since)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}
