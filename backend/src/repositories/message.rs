//! Contact message repository

use anyhow::Result;
use chrono::{DateTime, Utc};
use fittrack_shared::{MessageStatus, MessageType};
use sqlx::PgPool;
use uuid::Uuid;

/// Message row joined with its sender, if the account still exists
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MessageRecord {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub message_type: String,
    pub content: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub sender_email: Option<String>,
    pub sender_first_name: Option<String>,
    pub sender_last_name: Option<String>,
}

impl MessageRecord {
    pub fn kind(&self) -> MessageType {
        self.message_type.parse().unwrap_or(MessageType::Other)
    }

    pub fn state(&self) -> MessageStatus {
        self.status.parse().unwrap_or_default()
    }
}

pub struct MessageRepository;

impl MessageRepository {
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        message_type: MessageType,
        content: &str,
    ) -> Result<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO messages (user_id, message_type, content)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(message_type.as_str())
        .bind(content)
        .fetch_one(pool)
        .await?;

        Ok(id)
    }

    /// All messages, newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<MessageRecord>> {
        let records = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT m.id, m.user_id, m.message_type, m.content, m.status, m.created_at,
                   u.email AS sender_email,
                   u.first_name AS sender_first_name,
                   u.last_name AS sender_last_name
            FROM messages m
            LEFT JOIN users u ON u.id = m.user_id
            ORDER BY m.created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<MessageRecord>> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT m.id, m.user_id, m.message_type, m.content, m.status, m.created_at,
                   u.email AS sender_email,
                   u.first_name AS sender_first_name,
                   u.last_name AS sender_last_name
            FROM messages m
            LEFT JOIN users u ON u.id = m.user_id
            WHERE m.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Returns true if the message exists
    pub async fn set_status(pool: &PgPool, id: Uuid, status: MessageStatus) -> Result<bool> {
        let result = sqlx::query("UPDATE messages SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns true if a row was deleted
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
