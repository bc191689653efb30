//! User messages and staff triage

use crate::error::ApiError;
use crate::repositories::{MessageRecord, MessageRepository};
use fittrack_shared::types::{
    CreateMessageRequest, MessageResponse, MessageSender, UpdateMessageStatusRequest,
};
use fittrack_shared::{MessageStatus, MessageType};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

impl MessageRecord {
    fn into_response(self, include_sender: bool) -> MessageResponse {
        let sender = include_sender.then(|| MessageSender {
            user_id: self.user_id,
            first_name: self.sender_first_name.clone(),
            last_name: self.sender_last_name.clone(),
            email: self.sender_email.clone(),
        });

        MessageResponse {
            message_type: self.kind(),
            status: self.state(),
            id: self.id,
            content: self.content,
            created_at: self.created_at,
            sender,
        }
    }
}

pub struct MessageService;

impl MessageService {
    pub async fn submit(
        pool: &PgPool,
        user_id: Uuid,
        req: CreateMessageRequest,
    ) -> Result<MessageResponse, ApiError> {
        req.validate()?;

        let message_type: MessageType = req
            .message_type
            .trim()
            .to_lowercase()
            .parse()
            .map_err(|message| ApiError::InvalidField {
                field: "message_type".to_string(),
                message,
            })?;

        let content = req.content.trim();
        if content.is_empty() {
            return Err(ApiError::InvalidField {
                field: "content".to_string(),
                message: "Content cannot be empty".to_string(),
            });
        }

        let id = MessageRepository::create(pool, user_id, message_type, content)
            .await
            .map_err(ApiError::Internal)?;
        info!(user_id = %user_id, message_id = %id, kind = message_type.as_str(), "Message submitted");

        let record = Self::find(pool, id).await?;
        Ok(record.into_response(false))
    }

    async fn find(pool: &PgPool, id: Uuid) -> Result<MessageRecord, ApiError> {
        MessageRepository::find_by_id(pool, id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))
    }

    /// All messages with sender details, newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<MessageResponse>, ApiError> {
        let records = MessageRepository::list(pool)
            .await
            .map_err(ApiError::Internal)?;
        Ok(records.into_iter().map(|r| r.into_response(true)).collect())
    }

    pub async fn get(pool: &PgPool, id: Uuid) -> Result<MessageResponse, ApiError> {
        Ok(Self::find(pool, id).await?.into_response(true))
    }

    /// Set the triage status; an absent status marks the message seen
    pub async fn update_status(
        pool: &PgPool,
        id: Uuid,
        req: UpdateMessageStatusRequest,
    ) -> Result<MessageResponse, ApiError> {
        let status = match req.status.as_deref() {
            Some(s) => s.trim().to_lowercase().parse().map_err(|message| ApiError::InvalidField {
                field: "status".to_string(),
                message,
            })?,
            None => MessageStatus::Seen,
        };

        if !MessageRepository::set_status(pool, id, status)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::NotFound("Message not found".to_string()));
        }

        Self::get(pool, id).await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        if !MessageRepository::delete(pool, id)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::NotFound("Message not found".to_string()));
        }
        info!(message_id = %id, "Message deleted");
        Ok(())
    }
}
