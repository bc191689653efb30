//! Diet plan matching
//!
//! Ranks pre-built diet plans by how close their summed meal calories sit to
//! a calorie target. The repository pre-filters with the same band in SQL,
//! but [`match_plans`] re-applies every rule so its output depends only on
//! its inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum |total - target| for a plan to be considered
pub const CALORIE_TOLERANCE: i64 = 100;

/// Plans with fewer linked meals are never returned
pub const MIN_MEALS_PER_PLAN: i64 = 3;

/// Upper bound on returned matches
pub const MAX_MATCHES: usize = 5;

/// Half-width of the range suggested when nothing matches
pub const SUGGESTED_RANGE_SPREAD: i64 = 200;

pub const NO_MATCH_WARNING: &str = "No matching plans found - try expanding calorie range";

/// A meal linked to a candidate plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanMeal {
    pub meal_type: String,
    pub name: String,
    pub calories: i32,
    pub protein: i32,
    pub carbs: i32,
    pub fats: i32,
}

/// A diet plan with its totals computed from linked meals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietPlanCandidate {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub total_calories: i64,
    pub meal_count: i64,
    pub meals: Vec<PlanMeal>,
}

/// One ranked plan in a match response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedPlan {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub total_calories: i64,
    /// Signed: positive when the plan is above target
    pub calorie_deviation: i64,
    pub match_percentage: u8,
    pub meals: Vec<PlanMeal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalorieRange {
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMeta {
    pub tdee: i64,
    pub target_calories: i64,
    pub generated_at: DateTime<Utc>,
}

/// Full plan match response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanMatchResponse {
    pub meta: MatchMeta,
    pub plans: Vec<MatchedPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_range: Option<CalorieRange>,
}

/// Similarity score in 0..=100.
///
/// `round(100 × (1 − |deviation| / target))`, clamped. A non-positive target
/// yields 0 rather than dividing by zero.
pub fn match_percentage(total_calories: i64, target: i64) -> u8 {
    if target <= 0 {
        return 0;
    }
    let deviation = (total_calories - target).abs() as f64;
    let score = (100.0 * (1.0 - deviation / target as f64)).round();
    score.clamp(0.0, 100.0) as u8
}

/// Rank candidates against `target`.
///
/// Keeps plans with at least three meals whose total lies within the
/// tolerance band, orders them by absolute deviation then plan id, and
/// returns at most [`MAX_MATCHES`].
pub fn match_plans(target: i64, candidates: &[DietPlanCandidate]) -> Vec<MatchedPlan> {
    let mut matched: Vec<MatchedPlan> = candidates
        .iter()
        .filter(|c| c.meal_count >= MIN_MEALS_PER_PLAN)
        .filter(|c| (c.total_calories - target).abs() <= CALORIE_TOLERANCE)
        .map(|c| MatchedPlan {
            id: c.id,
            name: c.name.clone(),
            description: c.description.clone(),
            total_calories: c.total_calories,
            calorie_deviation: c.total_calories - target,
            match_percentage: match_percentage(c.total_calories, target),
            meals: c.meals.clone(),
        })
        .collect();

    matched.sort_by(|a, b| {
        a.calorie_deviation
            .abs()
            .cmp(&b.calorie_deviation.abs())
            .then_with(|| a.id.cmp(&b.id))
    });
    matched.truncate(MAX_MATCHES);
    matched
}

/// Range to suggest when nothing falls inside the tolerance band
pub fn suggested_range(target: i64) -> CalorieRange {
    CalorieRange {
        min: target - SUGGESTED_RANGE_SPREAD,
        max: target + SUGGESTED_RANGE_SPREAD,
    }
}

/// Build the complete response, attaching the advisory when empty
pub fn build_match_response(
    tdee: i64,
    target: i64,
    candidates: &[DietPlanCandidate],
    generated_at: DateTime<Utc>,
) -> PlanMatchResponse {
    let plans = match_plans(target, candidates);
    let (warning, suggested_range) = if plans.is_empty() {
        (Some(NO_MATCH_WARNING.to_string()), Some(suggested_range(target)))
    } else {
        (None, None)
    };

    PlanMatchResponse {
        meta: MatchMeta {
            tdee,
            target_calories: target,
            generated_at,
        },
        plans,
        warning,
        suggested_range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn candidate(n: u128, total: i64, meals: i64) -> DietPlanCandidate {
        DietPlanCandidate {
            id: Uuid::from_u128(n),
            name: format!("Plan {}", n),
            description: None,
            total_calories: total,
            meal_count: meals,
            meals: Vec::new(),
        }
    }

    #[test]
    fn test_reference_ranking() {
        let candidates = vec![
            candidate(1, 2400, 3),
            candidate(2, 2550, 3),
            candidate(3, 2800, 3),
            candidate(4, 2390, 3),
        ];
        let result = match_plans(2500, &candidates);
        let totals: Vec<i64> = result.iter().map(|p| p.total_calories).collect();
        assert_eq!(totals, vec![2550, 2400]);
        assert_eq!(result[0].calorie_deviation, 50);
        assert_eq!(result[0].match_percentage, 98);
        assert_eq!(result[1].calorie_deviation, -100);
        assert_eq!(result[1].match_percentage, 96);
    }

    #[test]
    fn test_requires_three_meals() {
        let candidates = vec![candidate(1, 2500, 2), candidate(2, 2510, 3)];
        let result = match_plans(2500, &candidates);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, Uuid::from_u128(2));
    }

    #[test]
    fn test_ties_break_on_id() {
        let candidates = vec![candidate(9, 2450, 3), candidate(3, 2550, 3)];
        let result = match_plans(2500, &candidates);
        assert_eq!(result[0].id, Uuid::from_u128(3));
        assert_eq!(result[1].id, Uuid::from_u128(9));
    }

    #[test]
    fn test_caps_at_five() {
        let candidates: Vec<_> = (0..8).map(|i| candidate(i, 2500 + i as i64, 3)).collect();
        assert_eq!(match_plans(2500, &candidates).len(), MAX_MATCHES);
    }

    #[test]
    fn test_zero_target_scores_zero() {
        assert_eq!(match_percentage(50, 0), 0);
        assert_eq!(match_percentage(50, -10), 0);
    }

    #[test]
    fn test_empty_response_has_advisory() {
        let response = build_match_response(2000, 2500, &[candidate(1, 3000, 3)], Utc::now());
        assert!(response.plans.is_empty());
        assert_eq!(response.warning.as_deref(), Some(NO_MATCH_WARNING));
        assert_eq!(response.suggested_range, Some(CalorieRange { min: 2300, max: 2700 }));
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let response = build_match_response(2749, 3249, &[candidate(1, 3249, 3)], Utc::now());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["meta"]["targetCalories"], 3249);
        assert_eq!(json["plans"][0]["calorieDeviation"], 0);
        assert_eq!(json["plans"][0]["matchPercentage"], 100);
        assert!(json.get("warning").is_none());
        assert!(json.get("suggestedRange").is_none());
    }

    fn candidates_strategy() -> impl Strategy<Value = Vec<DietPlanCandidate>> {
        prop::collection::vec((0u128..50, 2000i64..3000, 0i64..6), 0..20).prop_map(|rows| {
            rows.into_iter()
                .map(|(id, total, meals)| candidate(id, total, meals))
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: matching is idempotent for identical inputs
        #[test]
        fn prop_matching_idempotent(target in 1500i64..3500, candidates in candidates_strategy()) {
            prop_assert_eq!(match_plans(target, &candidates), match_plans(target, &candidates));
        }

        /// Property: every returned plan satisfies the band and meal-count rules
        #[test]
        fn prop_results_within_band(target in 1500i64..3500, candidates in candidates_strategy()) {
            let result = match_plans(target, &candidates);
            prop_assert!(result.len() <= MAX_MATCHES);
            for plan in &result {
                prop_assert!(plan.calorie_deviation.abs() <= CALORIE_TOLERANCE);
                prop_assert!(plan.match_percentage <= 100);
            }
            for pair in result.windows(2) {
                prop_assert!(pair[0].calorie_deviation.abs() <= pair[1].calorie_deviation.abs());
            }
        }
    }
}
