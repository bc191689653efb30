//! Prompt templates, response cleanup and static fallbacks

use fittrack_shared::types::{ChallengeExercise, DailyChallenge, DailyTip};
use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Subject details interpolated into plan prompts
#[derive(Debug, Clone)]
pub struct PromptSubject<'a> {
    pub height_cm: f64,
    pub weight_kg: f64,
    pub age_years: u32,
    pub gender: &'a str,
    pub goal: &'a str,
    pub training_days: u8,
}

const WORKOUT_SHAPE: &str = r#"{
  "workout_plan": {
    "name": "Plan name",
    "description": "One or two sentences on who the plan suits",
    "num_of_days": 3,
    "days": [
      {
        "day_num": 1,
        "exercises": [
          {
            "exercise": {"name": "Exercise name", "description": "How to perform it"},
            "sets": 3,
            "reps": 12,
            "order_in_day": 1
          }
        ]
      }
    ]
  }
}"#;

const DIET_SHAPE: &str = r#"{
  "name": "Plan name",
  "description": "Macro split and daily calorie total",
  "breakfast": [
    {"food": "Meal name", "description": "Ingredients with grams and preparation", "calories": 310, "protein": 22, "carbs": 6, "fat": 22}
  ],
  "lunch": [
    {"food": "Meal name", "description": "Ingredients with grams and preparation", "calories": 520, "protein": 40, "carbs": 45, "fat": 18}
  ],
  "dinner": [
    {"food": "Meal name", "description": "Ingredients with grams and preparation", "calories": 480, "protein": 38, "carbs": 35, "fat": 20}
  ]
}"#;

const RAW_JSON_ONLY: &str = "Respond with the raw JSON object only. No markdown fences, \
no commentary before or after it.";

pub fn workout_prompt(subject: &PromptSubject<'_>) -> String {
    format!(
        "Build a personalised workout plan for this person:\n\
         - Height: {height} cm\n\
         - Weight: {weight} kg\n\
         - Age: {age}\n\
         - Gender: {gender}\n\
         - Goal: {goal}\n\
         - Training days per week: {days}\n\n\
         Rules:\n\
         1. Assume a beginner unless the goal says otherwise.\n\
         2. Use exactly {days} entries in \"days\" and set \"num_of_days\" to {days}.\n\
         3. Give each day 3 to 6 exercises with realistic sets and reps.\n\
         4. Keep exercise descriptions short.\n\
         5. Follow this JSON shape exactly:\n{shape}\n\n{raw}",
        height = subject.height_cm,
        weight = subject.weight_kg,
        age = subject.age_years,
        gender = subject.gender,
        goal = subject.goal,
        days = subject.training_days.max(1),
        shape = WORKOUT_SHAPE,
        raw = RAW_JSON_ONLY,
    )
}

pub fn diet_prompt(subject: &PromptSubject<'_>, tdee: i64, target_calories: i64) -> String {
    format!(
        "Build a one-day diet plan for this person:\n\
         - Height: {height} cm\n\
         - Weight: {weight} kg\n\
         - Age: {age}\n\
         - Gender: {gender}\n\
         - Goal: {goal}\n\
         - Active days per week: {days}\n\
         - TDEE: {tdee} kcal\n\
         - Target intake: {target} kcal\n\n\
         Rules:\n\
         1. Meals across breakfast, lunch and dinner should add up to roughly {target} kcal.\n\
         2. Only use the breakfast, lunch and dinner lists. No snacks.\n\
         3. Follow this JSON shape exactly:\n{shape}\n\n{raw}",
        height = subject.height_cm,
        weight = subject.weight_kg,
        age = subject.age_years,
        gender = subject.gender,
        goal = subject.goal,
        days = subject.training_days,
        tdee = tdee,
        target = target_calories,
        shape = DIET_SHAPE,
        raw = RAW_JSON_ONLY,
    )
}

pub const DAILY_CHALLENGE_PROMPT: &str = r#"Create a fresh 10-minute HIIT session with exactly 4 exercises as JSON:
{
  "exercises": [
    {"name": "Exercise 1", "duration_seconds": 30},
    {"name": "Exercise 2", "reps": 15},
    {"name": "Exercise 3", "duration_seconds": 45},
    {"name": "Exercise 4", "reps": 12}
  ]
}
Mix timed ("duration_seconds") and counted ("reps") movements and vary them from day to day.
Respond with the raw JSON object only."#;

pub const DAILY_TIP_PROMPT: &str = r#"Write one short, specific and motivating fitness tip as JSON:
{"tip": "At most two sentences"}
Respond with the raw JSON object only."#;

pub const CHAT_SYSTEM_PROMPT: &str = "You are a fitness assistant. Answer questions about \
training, nutrition and recovery with specific examples and the reasoning behind each \
recommendation. Aim for at least three sentences. When discussing an exercise, cover proper \
form and common mistakes. Do not use markdown formatting.";

/// Strip a surrounding ```json / ``` fence if the model added one
pub fn strip_json_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest.trim_start();
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest.trim_start();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }
    text
}

pub fn fallback_challenge() -> DailyChallenge {
    let timed = |name: &str, secs| ChallengeExercise {
        name: name.to_string(),
        duration_seconds: Some(secs),
        reps: None,
    };
    let counted = |name: &str, reps| ChallengeExercise {
        name: name.to_string(),
        duration_seconds: None,
        reps: Some(reps),
    };

    DailyChallenge {
        exercises: vec![
            timed("Jumping Jacks", 30),
            counted("Push-ups", 10),
            timed("Mountain Climbers", 30),
            counted("Squats", 15),
        ],
    }
}

pub fn fallback_tip() -> DailyTip {
    DailyTip {
        tip: "Stay hydrated throughout your workout and maintain proper form during exercises."
            .to_string(),
    }
}

static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*(\d+\.)\s+").expect("list marker regex"));
static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z)][.!?])[ \t]+").expect("sentence regex"));
static NEWLINE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*").expect("newline regex"));

/// Plain-text cleanup for chat replies: drop markdown emphasis, start
/// numbered items and sentences on their own line.
pub fn clean_chat_reply(raw: &str) -> String {
    let text = raw.replace('*', "");
    let text = LIST_MARKER.replace_all(&text, "\n${1} ");
    let text = SENTENCE_END.replace_all(&text, "${1}\n");
    let text = NEWLINE_RUN.replace_all(&text, "\n");
    text.trim().to_string()
}
