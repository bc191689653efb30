//! Energy expenditure calculations
//!
//! BMR (Mifflin-St Jeor), activity tier selection, TDEE and goal-adjusted
//! calorie targets. Everything here is pure and synchronous; the backend,
//! the AI prompt builder and the WASM bindings all call into this module so
//! there is exactly one activity table and one BMR formula in the codebase.
//!
//! Full precision is kept until a caller-facing value is produced; only
//! [`EnergyEstimate`] carries rounded integers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::age::age_on;
use crate::errors::EnergyError;
use crate::validation::{validate_height_cm, validate_weight};

// ============================================================================
// Constants
// ============================================================================

/// Surplus added to TDEE for a muscle-gain target
pub const MUSCLE_GAIN_SURPLUS: i64 = 500;

/// Deficit subtracted from TDEE for a fat-loss target
pub const FAT_LOSS_DEFICIT: i64 = 500;

/// Fat-loss targets are never allowed below this many kcal
pub const MIN_FAT_LOSS_CALORIES: i64 = 1200;

/// Training days are clamped into this inclusive range
pub const MAX_TRAINING_DAYS: u8 = 7;

// ============================================================================
// Sex
// ============================================================================

/// Sex used for the BMR constant.
///
/// `Unspecified` is the documented fallback for any gender value other than
/// "male" or "female": it uses the midpoint of the two constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    Unspecified,
}

impl Sex {
    /// Parse a free-form gender string.
    ///
    /// Case-insensitive. A blank value is an error, any other unrecognized
    /// value maps to [`Sex::Unspecified`].
    pub fn parse(gender: &str) -> Result<Self, EnergyError> {
        let normalized = gender.trim().to_lowercase();
        match normalized.as_str() {
            "" => Err(EnergyError::missing("gender")),
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            _ => Ok(Sex::Unspecified),
        }
    }

    /// Additive constant in the Mifflin-St Jeor equation
    pub fn bmr_constant(&self) -> f64 {
        match self {
            Sex::Male => 5.0,
            Sex::Female => -161.0,
            Sex::Unspecified => -78.0,
        }
    }
}

// ============================================================================
// Activity tiers
// ============================================================================

/// Activity tier derived from weekly training days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityTier {
    /// 0-2 training days
    Light,
    /// 3-4 training days
    Moderate,
    /// 5-6 training days
    Active,
    /// 7 training days
    VeryActive,
}

impl ActivityTier {
    /// Select the tier for a weekly training-day count.
    ///
    /// Negative counts clamp to 0 and anything above 7 clamps to 7.
    pub fn from_training_days(days: i32) -> Self {
        match days.clamp(0, MAX_TRAINING_DAYS as i32) {
            0..=2 => ActivityTier::Light,
            3..=4 => ActivityTier::Moderate,
            5..=6 => ActivityTier::Active,
            _ => ActivityTier::VeryActive,
        }
    }

    /// TDEE multiplier for this tier
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityTier::Light => 1.375,
            ActivityTier::Moderate => 1.55,
            ActivityTier::Active => 1.725,
            ActivityTier::VeryActive => 1.9,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ActivityTier::Light => "light",
            ActivityTier::Moderate => "moderate",
            ActivityTier::Active => "active",
            ActivityTier::VeryActive => "very active",
        }
    }
}

// ============================================================================
// Fitness goals
// ============================================================================

/// Fitness goal selecting which calorie target applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FitnessGoal {
    MuscleGain,
    LoseFat,
    #[default]
    Maintain,
}

impl FitnessGoal {
    /// Parse a goal string. Unknown or missing goals mean maintenance.
    pub fn parse(goal: Option<&str>) -> Self {
        match goal.map(|g| g.trim().to_lowercase()).as_deref() {
            Some("gain_muscle") | Some("muscle_gain") => FitnessGoal::MuscleGain,
            Some("lose_fat") => FitnessGoal::LoseFat,
            _ => FitnessGoal::Maintain,
        }
    }

    /// Canonical storage/wire form
    pub fn as_str(&self) -> &'static str {
        match self {
            FitnessGoal::MuscleGain => "gain_muscle",
            FitnessGoal::LoseFat => "lose_fat",
            FitnessGoal::Maintain => "maintain",
        }
    }
}

// ============================================================================
// Profile
// ============================================================================

/// Validated biometric attributes needed for an energy estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiometricProfile {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age_years: u32,
    pub sex: Sex,
    /// Already clamped to 0..=7
    pub training_days_per_week: u8,
}

/// Raw, possibly incomplete biometric input as it arrives from a request
/// body or a stored user row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BiometricInput {
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub number_of_training_days: Option<i32>,
}

impl BiometricInput {
    /// Validate the input and derive a [`BiometricProfile`] as of `today`.
    ///
    /// Missing weight, height, birth date, gender or training days is an
    /// error; nothing is defaulted. Weight and height must fall inside the
    /// same bounds the profile endpoint enforces.
    pub fn resolve(&self, today: NaiveDate) -> Result<BiometricProfile, EnergyError> {
        let weight_kg = self.weight.ok_or_else(|| EnergyError::missing("weight"))?;
        validate_weight(weight_kg).map_err(|msg| EnergyError::invalid("weight", msg))?;

        let height_cm = self.height.ok_or_else(|| EnergyError::missing("height"))?;
        validate_height_cm(height_cm).map_err(|msg| EnergyError::invalid("height", msg))?;

        let birth_date = self
            .birth_date
            .ok_or_else(|| EnergyError::missing("birth_date"))?;
        let age_years = age_on(birth_date, today)?;

        let sex = match self.gender.as_deref() {
            Some(g) => Sex::parse(g)?,
            None => return Err(EnergyError::missing("gender")),
        };

        let days = self
            .number_of_training_days
            .ok_or_else(|| EnergyError::missing("number_of_training_days"))?;

        Ok(BiometricProfile {
            weight_kg,
            height_cm,
            age_years,
            sex,
            training_days_per_week: days.clamp(0, MAX_TRAINING_DAYS as i32) as u8,
        })
    }
}

// ============================================================================
// Calculations
// ============================================================================

/// Basal Metabolic Rate using the Mifflin-St Jeor equation
///
/// `10 × weight(kg) + 6.25 × height(cm) − 5 × age(y) + c`, where `c` is
/// +5 for men, −161 for women and −78 when sex is unspecified.
pub fn calculate_bmr(weight_kg: f64, height_cm: f64, age_years: u32, sex: Sex) -> f64 {
    10.0 * weight_kg + 6.25 * height_cm - 5.0 * age_years as f64 + sex.bmr_constant()
}

/// Total Daily Energy Expenditure, rounded to the nearest kcal
pub fn calculate_tdee(bmr: f64, tier: ActivityTier) -> i64 {
    (bmr * tier.multiplier()).round() as i64
}

/// Calorie targets derived from a TDEE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalTargets {
    pub muscle_gain: i64,
    pub lose_fat: i64,
    pub maintain: i64,
}

impl GoalTargets {
    pub fn from_tdee(tdee: i64) -> Self {
        Self {
            muscle_gain: tdee.saturating_add(MUSCLE_GAIN_SURPLUS),
            lose_fat: tdee
                .saturating_sub(FAT_LOSS_DEFICIT)
                .max(MIN_FAT_LOSS_CALORIES),
            maintain: tdee,
        }
    }

    /// Target for a single goal
    pub fn for_goal(&self, goal: FitnessGoal) -> i64 {
        match goal {
            FitnessGoal::MuscleGain => self.muscle_gain,
            FitnessGoal::LoseFat => self.lose_fat,
            FitnessGoal::Maintain => self.maintain,
        }
    }
}

/// Caller-facing energy estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyEstimate {
    /// Rounded BMR in kcal
    pub bmr: i64,
    pub tdee: i64,
    pub targets: GoalTargets,
}

/// Compute the full estimate for a validated profile
pub fn estimate_energy(profile: &BiometricProfile) -> EnergyEstimate {
    let bmr = calculate_bmr(
        profile.weight_kg,
        profile.height_cm,
        profile.age_years,
        profile.sex,
    );
    let tier = ActivityTier::from_training_days(profile.training_days_per_week as i32);
    let tdee = calculate_tdee(bmr, tier);

    EnergyEstimate {
        bmr: bmr.round() as i64,
        tdee,
        targets: GoalTargets::from_tdee(tdee),
    }
}

/// Validate raw input and compute the estimate in one step
pub fn estimate_from_input(
    input: &BiometricInput,
    today: NaiveDate,
) -> Result<EnergyEstimate, EnergyError> {
    let profile = input.resolve(today)?;
    Ok(estimate_energy(&profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn profile(sex: Sex, days: u8) -> BiometricProfile {
        BiometricProfile {
            weight_kg: 70.0,
            height_cm: 175.0,
            age_years: 25,
            sex,
            training_days_per_week: days,
        }
    }

    // =========================================================================
    // BMR
    // =========================================================================

    #[test]
    fn test_bmr_male_reference() {
        let bmr = calculate_bmr(70.0, 175.0, 25, Sex::Male);
        assert!((bmr - 1673.75).abs() < 1e-9);
    }

    #[test]
    fn test_bmr_female_reference() {
        let bmr = calculate_bmr(70.0, 175.0, 25, Sex::Female);
        assert!((bmr - 1507.75).abs() < 1e-9);
    }

    #[test]
    fn test_bmr_unspecified_is_midpoint() {
        let male = calculate_bmr(70.0, 175.0, 25, Sex::Male);
        let female = calculate_bmr(70.0, 175.0, 25, Sex::Female);
        let other = calculate_bmr(70.0, 175.0, 25, Sex::Unspecified);
        assert!((other - (male + female) / 2.0).abs() < 1e-9);
    }

    #[rstest]
    #[case("male", Sex::Male)]
    #[case("MALE", Sex::Male)]
    #[case(" Female ", Sex::Female)]
    #[case("non-binary", Sex::Unspecified)]
    #[case("other", Sex::Unspecified)]
    fn test_sex_parse(#[case] raw: &str, #[case] expected: Sex) {
        assert_eq!(Sex::parse(raw).unwrap(), expected);
    }

    #[test]
    fn test_blank_gender_rejected() {
        assert_eq!(Sex::parse("  ").unwrap_err(), EnergyError::missing("gender"));
    }

    // =========================================================================
    // Activity tiers
    // =========================================================================

    #[rstest]
    #[case(-3, 1.375)]
    #[case(0, 1.375)]
    #[case(1, 1.375)]
    #[case(2, 1.375)]
    #[case(3, 1.55)]
    #[case(4, 1.55)]
    #[case(5, 1.725)]
    #[case(6, 1.725)]
    #[case(7, 1.9)]
    #[case(12, 1.9)]
    fn test_activity_tier_table(#[case] days: i32, #[case] multiplier: f64) {
        assert_eq!(ActivityTier::from_training_days(days).multiplier(), multiplier);
    }

    // =========================================================================
    // Goals
    // =========================================================================

    #[rstest]
    #[case(Some("gain_muscle"), FitnessGoal::MuscleGain)]
    #[case(Some("Muscle_Gain"), FitnessGoal::MuscleGain)]
    #[case(Some("LOSE_FAT"), FitnessGoal::LoseFat)]
    #[case(Some("maintain"), FitnessGoal::Maintain)]
    #[case(Some("bulk"), FitnessGoal::Maintain)]
    #[case(None, FitnessGoal::Maintain)]
    fn test_goal_parse(#[case] raw: Option<&str>, #[case] expected: FitnessGoal) {
        assert_eq!(FitnessGoal::parse(raw), expected);
    }

    #[test]
    fn test_lose_fat_floor() {
        let targets = GoalTargets::from_tdee(1000);
        assert_eq!(targets.lose_fat, 1200);
        assert_eq!(targets.maintain, 1000);
        assert_eq!(targets.muscle_gain, 1500);
    }

    // =========================================================================
    // Estimates
    // =========================================================================

    #[test]
    fn test_estimate_male_moderate() {
        let estimate = estimate_energy(&profile(Sex::Male, 4));
        assert_eq!(estimate.bmr, 1674);
        assert_eq!(estimate.tdee, 2594);
        assert_eq!(estimate.targets.muscle_gain, 3094);
        assert_eq!(estimate.targets.for_goal(FitnessGoal::parse(Some("gain_muscle"))), 3094);
    }

    #[test]
    fn test_estimate_female_moderate() {
        let estimate = estimate_energy(&profile(Sex::Female, 4));
        assert_eq!(estimate.bmr, 1508);
        assert_eq!(estimate.tdee, 2337);
        assert_eq!(estimate.targets.lose_fat, 1837);
    }

    #[test]
    fn test_goal_targets_saturate_at_extremes() {
        let high = GoalTargets::from_tdee(i64::MAX);
        assert_eq!(high.muscle_gain, i64::MAX);
        assert_eq!(high.lose_fat, i64::MAX - FAT_LOSS_DEFICIT);

        let low = GoalTargets::from_tdee(i64::MIN);
        assert_eq!(low.lose_fat, MIN_FAT_LOSS_CALORIES);
    }

    #[rstest]
    #[case(Some(1e18), Some(175.0), "weight")]
    #[case(Some(10.0), Some(175.0), "weight")]
    #[case(Some(70.0), Some(1e18), "height")]
    #[case(Some(70.0), Some(30.0), "height")]
    fn test_resolve_rejects_out_of_range_body_metrics(
        #[case] weight: Option<f64>,
        #[case] height: Option<f64>,
        #[case] field: &str,
    ) {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let input = BiometricInput {
            weight,
            height,
            birth_date: NaiveDate::from_ymd_opt(1999, 6, 1),
            gender: Some("male".to_string()),
            number_of_training_days: Some(4),
        };
        let err = estimate_from_input(&input, today).unwrap_err();
        assert_eq!(err.field(), field);
    }

    #[test]
    fn test_resolve_requires_every_field() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let complete = BiometricInput {
            weight: Some(70.0),
            height: Some(175.0),
            birth_date: NaiveDate::from_ymd_opt(1999, 6, 1),
            gender: Some("male".to_string()),
            number_of_training_days: Some(4),
        };
        assert!(complete.resolve(today).is_ok());

        let cases: Vec<(&str, BiometricInput)> = vec![
            ("weight", BiometricInput { weight: None, ..complete.clone() }),
            ("height", BiometricInput { height: None, ..complete.clone() }),
            ("birth_date", BiometricInput { birth_date: None, ..complete.clone() }),
            ("gender", BiometricInput { gender: None, ..complete.clone() }),
            ("gender", BiometricInput { gender: Some(String::new()), ..complete.clone() }),
            (
                "number_of_training_days",
                BiometricInput { number_of_training_days: None, ..complete.clone() },
            ),
            ("weight", BiometricInput { weight: Some(-5.0), ..complete.clone() }),
            ("height", BiometricInput { height: Some(f64::NAN), ..complete.clone() }),
        ];

        for (field, input) in cases {
            let err = input.resolve(today).unwrap_err();
            assert_eq!(err.field(), field, "input {:?}", input);
        }
    }

    #[test]
    fn test_resolve_clamps_training_days() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let input = BiometricInput {
            weight: Some(70.0),
            height: Some(175.0),
            birth_date: NaiveDate::from_ymd_opt(1999, 6, 1),
            gender: Some("female".to_string()),
            number_of_training_days: Some(10),
        };
        assert_eq!(input.resolve(today).unwrap().training_days_per_week, 7);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: male BMR exceeds female BMR by exactly 166 for equal inputs
        #[test]
        fn prop_male_female_gap(
            weight in 30.0f64..200.0,
            height in 120.0f64..220.0,
            age in 10u32..90
        ) {
            let gap = calculate_bmr(weight, height, age, Sex::Male)
                - calculate_bmr(weight, height, age, Sex::Female);
            prop_assert!((gap - 166.0).abs() < 1e-9);
        }

        /// Property: the fat-loss target never drops below the floor
        #[test]
        fn prop_lose_fat_never_below_floor(tdee in 0i64..6000) {
            prop_assert!(GoalTargets::from_tdee(tdee).lose_fat >= MIN_FAT_LOSS_CALORIES);
        }

        /// Property: more training days never lowers the multiplier
        #[test]
        fn prop_multiplier_monotonic(a in -5i32..15, b in -5i32..15) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(
                ActivityTier::from_training_days(lo).multiplier()
                    <= ActivityTier::from_training_days(hi).multiplier()
            );
        }
    }
}
