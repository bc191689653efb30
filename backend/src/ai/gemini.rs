//! Google Gemini `generateContent` client

use super::{ChatRole, ChatTurn, GenerationError, TextGenerator};
use crate::config::AiConfig;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ============================================================================
// Client
// ============================================================================

pub struct GeminiClient {
    client: Client,
    api_key: Secret<String>,
    model: String,
    base_url: String,
    enabled: bool,
}

impl GeminiClient {
    pub fn new(config: &AiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            enabled: config.enabled && !config.api_key.expose_secret().is_empty(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request(system: Option<&str>, history: &[ChatTurn], message: &str) -> GenerateRequest {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|turn| Content::text(Some(turn.role.as_str()), &turn.text))
            .collect();
        contents.push(Content::text(Some(ChatRole::User.as_str()), message));

        GenerateRequest {
            contents,
            system_instruction: system.map(|s| Content::text(None, s)),
        }
    }

    fn extract_text(response: GenerateResponse) -> Result<String, GenerationError> {
        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(GenerationError::Blocked(reason));
        }

        let candidate = response
            .candidates
            .and_then(|c| c.into_iter().next())
            .ok_or(GenerationError::NoResponse)?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return match candidate.finish_reason.as_deref() {
                Some("SAFETY") => Err(GenerationError::Blocked("SAFETY".to_string())),
                _ => Err(GenerationError::NoResponse),
            };
        }
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn chat(
        &self,
        system: Option<&str>,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String, GenerationError> {
        if !self.enabled {
            return Err(GenerationError::Disabled);
        }

        let body = Self::build_request(system, history, message);
        debug!(model = %self.model, turns = body.contents.len(), "Sending request to Gemini");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| text.clone());
            error!(status = %status, "Gemini API error");
            return Err(GenerationError::Transport(format!("HTTP {}: {}", status, message)));
        }

        let parsed: GenerateResponse = serde_json::from_str(&text).map_err(|e| {
            warn!(error = %e, "Unparseable Gemini response");
            GenerationError::Transport(format!("Invalid response body: {}", e))
        })?;

        Self::extract_text(parsed)
    }
}
