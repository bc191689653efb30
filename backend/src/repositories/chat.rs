//! Assistant chat history repository

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChatMessageRecord {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

pub struct ChatRepository;

impl ChatRepository {
    /// Turns of a conversation in the order they were stored
    pub async fn history(
        pool: &PgPool,
        chat_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<ChatMessageRecord>> {
        let records = sqlx::query_as::<_, ChatMessageRecord>(
            r#"
            SELECT * FROM chat_messages
            WHERE chat_id = $1 AND user_id = $2
            ORDER BY created_at, id
            "#,
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Persist a user turn and the model's reply together
    pub async fn append_exchange(
        pool: &PgPool,
        chat_id: Uuid,
        user_id: Uuid,
        user_text: &str,
        model_text: &str,
    ) -> Result<()> {
        let mut tx = pool.begin().await?;

        // Distinct timestamps keep the pair ordered on replay
        sqlx::query(
            r#"
            INSERT INTO chat_messages (chat_id, user_id, role, content, created_at)
            VALUES ($1, $2, 'user', $3, clock_timestamp()),
                   ($1, $2, 'model', $4, clock_timestamp() + INTERVAL '1 microsecond')
            "#,
        )
        .bind(chat_id)
        .bind(user_id)
        .bind(user_text)
        .bind(model_text)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
