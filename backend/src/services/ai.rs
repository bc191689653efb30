//! AI-generated plans, daily content and assistant chat

use crate::ai::prompts::{
    clean_chat_reply, diet_prompt, fallback_challenge, fallback_tip, strip_json_fences,
    workout_prompt, PromptSubject, CHAT_SYSTEM_PROMPT, DAILY_CHALLENGE_PROMPT, DAILY_TIP_PROMPT,
};
use crate::ai::{ChatRole, ChatTurn, GenerationError, TextGenerator};
use crate::error::ApiError;
use crate::repositories::ChatRepository;
use crate::telemetry;
use chrono::NaiveDate;
use fittrack_shared::types::{
    ChatRequest, ChatResponse, DailyChallenge, DailyTip, GeneratePlanRequest, GeneratedDietPlan,
    GeneratedWorkoutEnvelope,
};
use fittrack_shared::{estimate_energy, FitnessGoal};
use serde::de::DeserializeOwned;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

fn record(kind: &'static str, outcome: &'static str) {
    metrics::counter!(telemetry::AI_REQUESTS, "kind" => kind, "outcome" => outcome).increment(1);
}

fn outcome_of(err: &GenerationError) -> &'static str {
    match err {
        GenerationError::Blocked(_) => "blocked",
        GenerationError::NoResponse => "no_response",
        GenerationError::Transport(_) => "transport",
        GenerationError::Disabled => "disabled",
    }
}

/// Parse model output as JSON, tolerating a markdown fence around it
fn parse_json<T: DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(strip_json_fences(raw))
}

fn required_goal(req: &GeneratePlanRequest) -> Result<&str, ApiError> {
    req.goal
        .as_deref()
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .ok_or_else(|| ApiError::InvalidField {
            field: "goal".to_string(),
            message: "goal is required".to_string(),
        })
}

pub struct AiService;

impl AiService {
    async fn generate_json<T: DeserializeOwned>(
        ai: &dyn TextGenerator,
        kind: &'static str,
        prompt: &str,
    ) -> Result<T, ApiError> {
        let raw = ai.generate(prompt).await.map_err(|e| {
            record(kind, outcome_of(&e));
            ApiError::from(e)
        })?;

        match parse_json(&raw) {
            Ok(parsed) => {
                record(kind, "ok");
                Ok(parsed)
            }
            Err(e) => {
                record(kind, "invalid_json");
                warn!(kind, error = %e, "AI returned malformed JSON");
                Err(ApiError::Upstream(format!(
                    "AI returned malformed JSON: {}",
                    raw.trim()
                )))
            }
        }
    }

    /// Generate a workout plan for the biometrics in the request
    pub async fn generate_workout(
        ai: &dyn TextGenerator,
        req: &GeneratePlanRequest,
        today: NaiveDate,
    ) -> Result<GeneratedWorkoutEnvelope, ApiError> {
        let goal = required_goal(req)?;
        let profile = req.biometrics.resolve(today)?;
        let gender = req.biometrics.gender.as_deref().unwrap_or_default().trim();

        let prompt = workout_prompt(&PromptSubject {
            height_cm: profile.height_cm,
            weight_kg: profile.weight_kg,
            age_years: profile.age_years,
            gender,
            goal,
            training_days: profile.training_days_per_week,
        });

        Self::generate_json(ai, "workout", &prompt).await
    }

    /// Generate a one-day diet plan sized to the goal's calorie target
    pub async fn generate_diet(
        ai: &dyn TextGenerator,
        req: &GeneratePlanRequest,
        today: NaiveDate,
    ) -> Result<GeneratedDietPlan, ApiError> {
        let goal = required_goal(req)?;
        let profile = req.biometrics.resolve(today)?;
        let estimate = estimate_energy(&profile);
        let target = estimate.targets.for_goal(FitnessGoal::parse(Some(goal)));
        let gender = req.biometrics.gender.as_deref().unwrap_or_default().trim();

        let prompt = diet_prompt(
            &PromptSubject {
                height_cm: profile.height_cm,
                weight_kg: profile.weight_kg,
                age_years: profile.age_years,
                gender,
                goal,
                training_days: profile.training_days_per_week,
            },
            estimate.tdee,
            target,
        );

        Self::generate_json(ai, "diet", &prompt).await
    }

    /// Today's HIIT challenge. Safety blocks and empty responses surface as
    /// errors; anything else falls back to a fixed routine.
    pub async fn daily_challenge(ai: &dyn TextGenerator) -> Result<DailyChallenge, ApiError> {
        match ai.generate(DAILY_CHALLENGE_PROMPT).await {
            Ok(raw) => match parse_json::<DailyChallenge>(&raw) {
                Ok(challenge) if !challenge.exercises.is_empty() => {
                    record("challenge", "ok");
                    Ok(challenge)
                }
                _ => {
                    record("challenge", "fallback");
                    warn!("Unusable daily challenge, serving fallback");
                    Ok(fallback_challenge())
                }
            },
            Err(e @ (GenerationError::Blocked(_) | GenerationError::NoResponse)) => {
                record("challenge", outcome_of(&e));
                Err(e.into())
            }
            Err(e) => {
                record("challenge", "fallback");
                warn!(error = %e, "Daily challenge generation failed, serving fallback");
                Ok(fallback_challenge())
            }
        }
    }

    /// Today's tip; always succeeds
    pub async fn daily_tip(ai: &dyn TextGenerator) -> DailyTip {
        let parsed = match ai.generate(DAILY_TIP_PROMPT).await {
            Ok(raw) => parse_json::<DailyTip>(&raw)
                .ok()
                .filter(|t| !t.tip.trim().is_empty()),
            Err(e) => {
                warn!(error = %e, "Daily tip generation failed");
                None
            }
        };

        match parsed {
            Some(tip) => {
                record("tip", "ok");
                tip
            }
            None => {
                record("tip", "fallback");
                fallback_tip()
            }
        }
    }

    /// One chat exchange. History is scoped to `(chat_id, user_id)`, so an
    /// id belonging to someone else starts empty.
    pub async fn chat(
        pool: &PgPool,
        ai: &dyn TextGenerator,
        user_id: Uuid,
        req: ChatRequest,
    ) -> Result<ChatResponse, ApiError> {
        req.validate()?;
        let message = req.message.trim();
        if message.is_empty() {
            return Err(ApiError::InvalidField {
                field: "message".to_string(),
                message: "Message is required".to_string(),
            });
        }

        let chat_id = req.chat_id.unwrap_or_else(Uuid::new_v4);
        let history: Vec<ChatTurn> = ChatRepository::history(pool, chat_id, user_id)
            .await
            .map_err(ApiError::Internal)?
            .into_iter()
            .filter_map(|m| {
                ChatRole::parse(&m.role).map(|role| ChatTurn {
                    role,
                    text: m.content,
                })
            })
            .collect();

        let reply = ai
            .chat(Some(CHAT_SYSTEM_PROMPT), &history, message)
            .await
            .map_err(|e| {
                record("chat", outcome_of(&e));
                ApiError::from(e)
            })?;
        record("chat", "ok");

        let response = clean_chat_reply(&reply);
        ChatRepository::append_exchange(pool, chat_id, user_id, message, &response)
            .await
            .map_err(ApiError::Internal)?;

        Ok(ChatResponse { response, chat_id })
    }
}
