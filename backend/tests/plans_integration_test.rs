//! Integration tests for workout tracking and diet plan matching

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

/// Admin creates a 3-day plan with one exercise on day 1
async fn seed_workout_plan(app: &common::TestApp) -> (String, String) {
    let (_, admin) = app.user_with_role("admin").await;

    let (status, exercise) = app
        .post_auth(
            "/api/v1/admin/exercises",
            &admin,
            json!({ "name": "Goblet Squat", "sets": 3, "reps": 10 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let exercise_id = exercise["id"].as_str().unwrap().to_string();

    let (status, plan) = app
        .post_auth(
            "/api/v1/admin/workout-plans",
            &admin,
            json!({ "name": "Three Day Base", "number_of_days": 3 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let plan_id = plan["id"].as_str().unwrap().to_string();

    let (status, details) = app
        .post_auth(
            &format!("/api/v1/admin/workout-plans/{}/exercises", plan_id),
            &admin,
            json!({ "exercise_id": exercise_id, "day_number": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["days"][0]["exercises"][0]["position"], 1);

    (plan_id, exercise_id)
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_available_plans_need_training_days() {
    let app = common::TestApp::new().await;
    let (_, token) = app.register_user().await;

    let (status, response) = app.get_auth("/api/v1/workouts/available", &token).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"]["field"], "number_of_training_days");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_select_plan_and_log_exercise() {
    let app = common::TestApp::new().await;
    let (plan_id, exercise_id) = seed_workout_plan(&app).await;
    let (_, token) = app.register_user().await;
    app.complete_profile(&token, "maintain").await;

    let (status, plans) = app.get_auth("/api/v1/workouts/available", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert!(plans
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["id"] == plan_id.as_str()));

    // Logging before a plan is assigned is rejected
    let log = json!({ "exercise_id": exercise_id, "weight": 42.5 });
    let (status, _) = app.post_auth("/api/v1/workouts/logs", &token, log.clone()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post_auth("/api/v1/workouts/select", &token, json!({ "plan_id": plan_id }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, entry) = app.post_auth("/api/v1/workouts/logs", &token, log).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["exercise_name"], "Goblet Squat");
    assert_eq!(entry["weight"], 42.5);

    let (status, today) = app.get_auth("/api/v1/workouts/logs/today", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(today.as_array().unwrap().len(), 1);

    let (status, stats) = app.get_auth("/api/v1/workouts/today", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["exercises_completed"], 1);
    assert_eq!(stats["daily_counter"], 1);

    let (status, profile) = app.get_auth("/api/v1/profile", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["workout_plan"]["id"], plan_id.as_str());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_negative_lift_weight_rejected() {
    let app = common::TestApp::new().await;
    let (_, token) = app.register_user().await;

    let log = json!({ "exercise_id": uuid::Uuid::new_v4(), "weight": -5.0 });
    let (status, _) = app.post_auth("/api/v1/workouts/logs", &token, log).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

async fn create_meal(app: &common::TestApp, admin: &str, name: &str, calories: i64) -> String {
    let (status, meal) = app
        .post_auth(
            "/api/v1/admin/meals",
            admin,
            json!({ "name": name, "calories": calories, "protein": 30, "carbs": 40, "fats": 10 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    meal["id"].as_str().unwrap().to_string()
}

async fn create_diet_plan(app: &common::TestApp, admin: &str, meals: &[(&str, &str)]) -> String {
    let (status, plan) = app
        .post_auth("/api/v1/admin/diet-plans", admin, json!({ "name": "Matched Plan" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let plan_id = plan["id"].as_str().unwrap().to_string();

    for (meal_id, slot) in meals {
        let (status, _) = app
            .post_auth(
                &format!("/api/v1/admin/diet-plans/{}/meals", plan_id),
                admin,
                json!({ "meal_id": meal_id, "meal_type": slot }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }
    plan_id
}

fn plan_ids(response: &Value) -> Vec<String> {
    response["plans"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_diet_matches_exact_plan_and_skips_short_plans() {
    let app = common::TestApp::new().await;
    let (_, admin) = app.user_with_role("admin").await;
    let (_, token) = app.register_user().await;
    app.complete_profile(&token, "lose_fat").await;

    let (status, energy) = app.get_auth("/api/v1/profile/energy", &token).await;
    assert_eq!(status, StatusCode::OK);
    let target = energy["target_calories"].as_i64().unwrap();

    let third = target / 3;
    let breakfast = create_meal(&app, &admin, "Oats", third).await;
    let lunch = create_meal(&app, &admin, "Rice Bowl", third).await;
    let dinner = create_meal(&app, &admin, "Salmon", target - 2 * third).await;
    let full = create_diet_plan(
        &app,
        &admin,
        &[(&breakfast, "breakfast"), (&lunch, "lunch"), (&dinner, "dinner")],
    )
    .await;

    // Two meals hitting the target exactly still do not qualify
    let big = create_meal(&app, &admin, "Big Lunch", target - third).await;
    let short = create_diet_plan(&app, &admin, &[(&breakfast, "breakfast"), (&big, "lunch")]).await;

    let (status, response) = app.get_auth("/api/v1/diet/matches", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["meta"]["targetCalories"], target);

    let ids = plan_ids(&response);
    assert!(ids.contains(&full));
    assert!(!ids.contains(&short));
    assert_eq!(response["plans"][0]["matchPercentage"], 100);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_diet_matches_goal_override_changes_target() {
    let app = common::TestApp::new().await;
    let (_, token) = app.register_user().await;
    app.complete_profile(&token, "maintain").await;

    let (status, maintain) = app.get_auth("/api/v1/diet/matches", &token).await;
    assert_eq!(status, StatusCode::OK);

    let (status, gain) = app
        .get_auth("/api/v1/diet/matches?goal=gain_muscle", &token)
        .await;
    assert_eq!(status, StatusCode::OK);

    let maintain_target = maintain["meta"]["targetCalories"].as_i64().unwrap();
    let gain_target = gain["meta"]["targetCalories"].as_i64().unwrap();
    assert_eq!(gain_target, maintain_target + 500);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_select_diet_plan() {
    let app = common::TestApp::new().await;
    let (_, admin) = app.user_with_role("admin").await;
    let meal = create_meal(&app, &admin, "Eggs", 400).await;
    let plan_id = create_diet_plan(&app, &admin, &[(&meal, "breakfast")]).await;
    let (_, token) = app.register_user().await;

    let (status, plan) = app
        .post_auth("/api/v1/diet/select", &token, json!({ "plan_id": plan_id }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["totals"]["calories"], 400);

    let (status, assigned) = app.get_auth("/api/v1/diet/plan", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(assigned["id"], plan_id.as_str());
    assert_eq!(assigned["breakfast"][0]["name"], "Eggs");
}
