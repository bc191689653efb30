//! Input validation functions
//!
//! This module provides validation utilities for user input.
//! Request structs additionally derive `validator::Validate` for the simple
//! length/range checks; the functions here cover the rules that need code.

use chrono::NaiveDate;

use crate::age::age_on;

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.len() > 255 {
        return Err("Email too long".to_string());
    }
    let well_formed = regex_lite::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .map(|re| re.is_match(email))
        .unwrap_or(false);
    if !well_formed {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }
    if password.len() > 128 {
        return Err("Password too long".to_string());
    }
    Ok(())
}

/// Validate body weight (in kg)
pub fn validate_weight(weight_kg: f64) -> Result<(), String> {
    if weight_kg.is_nan() || weight_kg.is_infinite() {
        return Err("Weight must be a valid number".to_string());
    }
    if weight_kg < 20.0 {
        return Err("Weight must be at least 20 kg".to_string());
    }
    if weight_kg > 500.0 {
        return Err("Weight must be at most 500 kg".to_string());
    }
    Ok(())
}

/// Validate a lifted weight (in kg); zero is allowed for bodyweight moves
pub fn validate_lift_weight(weight_kg: f64) -> Result<(), String> {
    if weight_kg.is_nan() || weight_kg.is_infinite() {
        return Err("Weight must be a valid number".to_string());
    }
    if !(0.0..=1000.0).contains(&weight_kg) {
        return Err("Weight must be between 0 and 1000 kg".to_string());
    }
    Ok(())
}

// ============================================================================
// Profile Validation
// ============================================================================

/// Validate height value (in cm)
/// Valid range: 50-300 cm
pub fn validate_height_cm(height_cm: f64) -> Result<(), String> {
    if height_cm.is_nan() || height_cm.is_infinite() {
        return Err("Height must be a valid number".to_string());
    }
    if height_cm < 50.0 {
        return Err("Height must be at least 50 cm".to_string());
    }
    if height_cm > 300.0 {
        return Err("Height must be at most 300 cm".to_string());
    }
    Ok(())
}

/// Validate date of birth against `today`.
/// Must not be in the future, and age must be between 1 and 150 years.
pub fn validate_date_of_birth(dob: NaiveDate, today: NaiveDate) -> Result<(), String> {
    match age_on(dob, today) {
        Err(_) => Err("Date of birth cannot be in the future".to_string()),
        Ok(age) if age < 1 => Err("Age must be at least 1 year".to_string()),
        Ok(age) if age > 150 => Err("Age cannot exceed 150 years".to_string()),
        Ok(_) => Ok(()),
    }
}

/// Validate weekly training days
pub fn validate_training_days(days: i32) -> Result<(), String> {
    if !(0..=7).contains(&days) {
        return Err("Training days must be between 0 and 7".to_string());
    }
    Ok(())
}

/// Validate a gender value.
///
/// Any non-blank value is accepted; values other than male/female fall back
/// to the averaged BMR constant.
pub fn validate_gender(gender: &str) -> Result<(), String> {
    if gender.trim().is_empty() {
        return Err("Gender cannot be empty".to_string());
    }
    if gender.len() > 32 {
        return Err("Gender too long".to_string());
    }
    Ok(())
}

/// Valid fitness goal values
pub const VALID_FITNESS_GOALS: &[&str] = &["gain_muscle", "lose_fat", "maintain"];

/// Validate fitness goal
pub fn validate_fitness_goal(goal: &str) -> Result<(), String> {
    let normalized = goal.trim().to_lowercase();
    if VALID_FITNESS_GOALS.contains(&normalized.as_str()) || normalized == "muscle_gain" {
        Ok(())
    } else {
        Err(format!(
            "Invalid fitness goal. Must be one of: {}",
            VALID_FITNESS_GOALS.join(", ")
        ))
    }
}

// ============================================================================
// User-Friendly Field Labels
// ============================================================================

/// Map technical field names to user-friendly display labels
pub fn get_field_display_label(field_name: &str) -> &str {
    match field_name {
        "weight" | "weight_kg" => "Current Weight",
        "height" | "height_cm" => "Height",
        "birth_date" => "Date of Birth",
        "gender" => "Gender",
        "number_of_training_days" => "Training Days per Week",
        "fitness_goal" => "Fitness Goal",
        "first_name" => "First Name",
        "last_name" => "Last Name",
        "email" => "Email",
        "password" => "Password",
        _ => field_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("user.name@domain.co.uk").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("no@dot").is_err());
        assert!(validate_email("spaces in@email.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_weight() {
        assert!(validate_weight(70.0).is_ok());
        assert!(validate_weight(20.0).is_ok());
        assert!(validate_weight(500.0).is_ok());
        assert!(validate_weight(10.0).is_err());
        assert!(validate_weight(600.0).is_err());
        assert!(validate_weight(f64::NAN).is_err());
        assert!(validate_weight(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_lift_weight() {
        assert!(validate_lift_weight(0.0).is_ok());
        assert!(validate_lift_weight(142.5).is_ok());
        assert!(validate_lift_weight(-1.0).is_err());
        assert!(validate_lift_weight(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_height_cm() {
        assert!(validate_height_cm(170.0).is_ok());
        assert!(validate_height_cm(50.0).is_ok());
        assert!(validate_height_cm(300.0).is_ok());

        assert!(validate_height_cm(49.9).is_err());
        assert!(validate_height_cm(300.1).is_err());
        assert!(validate_height_cm(-10.0).is_err());
        assert!(validate_height_cm(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_date_of_birth() {
        let today = today();
        assert!(validate_date_of_birth(NaiveDate::from_ymd_opt(1995, 3, 10).unwrap(), today).is_ok());
        assert!(validate_date_of_birth(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), today).is_ok());

        // future
        assert!(validate_date_of_birth(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(), today).is_err());
        // under a year
        assert!(validate_date_of_birth(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(), today).is_err());
        // over 150
        assert!(validate_date_of_birth(NaiveDate::from_ymd_opt(1800, 1, 1).unwrap(), today).is_err());
    }

    #[test]
    fn test_validate_gender() {
        assert!(validate_gender("male").is_ok());
        assert!(validate_gender("Female").is_ok());
        assert!(validate_gender("non-binary").is_ok());
        assert!(validate_gender("").is_err());
        assert!(validate_gender("   ").is_err());
    }

    #[test]
    fn test_validate_fitness_goal() {
        assert!(validate_fitness_goal("gain_muscle").is_ok());
        assert!(validate_fitness_goal("LOSE_FAT").is_ok());
        assert!(validate_fitness_goal("maintain").is_ok());
        assert!(validate_fitness_goal("muscle_gain").is_ok());
        assert!(validate_fitness_goal("bulk").is_err());
    }

    #[test]
    fn test_field_display_labels() {
        assert_eq!(get_field_display_label("birth_date"), "Date of Birth");
        assert_eq!(get_field_display_label("number_of_training_days"), "Training Days per Week");
        assert_eq!(get_field_display_label("height_cm"), "Height");
        assert_eq!(get_field_display_label("unknown_field"), "unknown_field");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_valid_weight_range(weight in 20.0f64..=500.0) {
            prop_assert!(validate_weight(weight).is_ok());
        }

        #[test]
        fn prop_invalid_weight_below_min(weight in 0.0f64..20.0) {
            prop_assert!(validate_weight(weight).is_err());
        }

        #[test]
        fn prop_valid_height_range(height in 50.0f64..=300.0) {
            prop_assert!(validate_height_cm(height).is_ok(),
                "Height {} should be valid", height);
        }

        #[test]
        fn prop_training_days_bounds(days in -20i32..20) {
            prop_assert_eq!(validate_training_days(days).is_ok(), (0..=7).contains(&days));
        }

        #[test]
        fn prop_password_length_valid(len in 8usize..=128) {
            let password: String = (0..len).map(|_| 'a').collect();
            prop_assert!(validate_password(&password).is_ok());
        }
    }
}
