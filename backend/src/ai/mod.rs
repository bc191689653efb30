//! Generative text provider abstraction
//!
//! Handlers depend on [`TextGenerator`] rather than a concrete client so the
//! provider can be swapped (or faked in tests) through `AppState`.

mod gemini;
pub mod prompts;

pub use gemini::GeminiClient;

use crate::error::ApiError;
use async_trait::async_trait;
use thiserror::Error;

/// Speaker of one chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(ChatRole::User),
            "model" => Some(ChatRole::Model),
            _ => None,
        }
    }
}

/// One prior exchange in a conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Request blocked by safety filter: {0}")]
    Blocked(String),

    #[error("Received no response from the AI service")]
    NoResponse,

    #[error("AI service request failed: {0}")]
    Transport(String),

    #[error("AI features are not configured")]
    Disabled,
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Blocked(_) => ApiError::BadRequest(err.to_string()),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Continue a conversation. `system` primes the model; `history` is
    /// oldest-first.
    async fn chat(
        &self,
        system: Option<&str>,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String, GenerationError>;

    /// Single-shot prompt
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.chat(None, &[], prompt).await
    }
}
