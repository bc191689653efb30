//! FitTrack WASM Module
//!
//! Exposes the calorie engine to the browser so the profile form can preview
//! targets before saving. Results cross the boundary as JSON strings.

use chrono::NaiveDate;
use fittrack_shared::{
    age_on, estimate_from_input, plan_matching::match_percentage as percentage, BiometricInput,
    FitnessGoal,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct Preview {
    bmr: i64,
    tdee: i64,
    muscle_gain: i64,
    lose_fat: i64,
    maintain: i64,
    target_calories: i64,
}

fn parse_date(value: &str) -> Result<NaiveDate, JsValue> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| JsValue::from_str("Dates must be formatted as YYYY-MM-DD"))
}

/// Energy estimate for a JSON `BiometricInput`, evaluated as of `today`.
///
/// Returns a JSON object with BMR, TDEE, all three goal targets and the
/// target for `goal`. Invalid input is thrown as a string message.
#[wasm_bindgen]
pub fn estimate_energy(input_json: &str, goal: Option<String>, today: &str) -> Result<String, JsValue> {
    let input: BiometricInput =
        serde_json::from_str(input_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let estimate = estimate_from_input(&input, parse_date(today)?)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let preview = Preview {
        bmr: estimate.bmr,
        tdee: estimate.tdee,
        muscle_gain: estimate.targets.muscle_gain,
        lose_fat: estimate.targets.lose_fat,
        maintain: estimate.targets.maintain,
        target_calories: estimate
            .targets
            .for_goal(FitnessGoal::parse(goal.as_deref())),
    };
    serde_json::to_string(&preview).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Whole years between `birth_date` and `today`
#[wasm_bindgen]
pub fn age_in_years(birth_date: &str, today: &str) -> Result<u32, JsValue> {
    age_on(parse_date(birth_date)?, parse_date(today)?).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Similarity of a plan's calories to a target, 0..=100
#[wasm_bindgen]
pub fn match_percentage(total_calories: i64, target: i64) -> u8 {
    percentage(total_calories, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_percentage() {
        assert_eq!(match_percentage(2000, 2000), 100);
        assert_eq!(match_percentage(1900, 2000), 95);
        assert_eq!(match_percentage(500, 0), 0);
    }

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2001-02-03").is_ok());
    }
}
