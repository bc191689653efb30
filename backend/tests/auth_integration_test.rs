//! Integration tests for authentication endpoints

mod common;

use axum::http::{Method, StatusCode};
use common::unique_email;
use serde_json::json;

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_success() {
    let app = common::TestApp::new().await;

    let body = json!({
        "email": unique_email("register_test"),
        "password": "SecurePassword123!"
    });

    let (status, response) = app.post("/api/v1/auth/register", &body.to_string()).await;

    assert_eq!(status, StatusCode::CREATED);

    let response: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert!(!response["access_token"].as_str().unwrap().is_empty());
    assert!(!response["refresh_token"].as_str().unwrap().is_empty());
    assert_eq!(response["token_type"], "Bearer");
    assert_eq!(response["role"], "user");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_duplicate_email_ignores_case() {
    let app = common::TestApp::new().await;

    let email = unique_email("duplicate");
    let body = json!({ "email": email, "password": "SecurePassword123!" });
    let (status, _) = app.post("/api/v1/auth/register", &body.to_string()).await;
    assert_eq!(status, StatusCode::CREATED);

    let body = json!({ "email": email.to_uppercase(), "password": "SecurePassword123!" });
    let (status, _) = app.post("/api/v1/auth/register", &body.to_string()).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_invalid_email() {
    let app = common::TestApp::new().await;

    let body = json!({
        "email": "not-an-email",
        "password": "SecurePassword123!"
    });

    let (status, _) = app.post("/api/v1/auth/register", &body.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_weak_password() {
    let app = common::TestApp::new().await;

    let body = json!({
        "email": unique_email("weak_password"),
        "password": "123"
    });

    let (status, _) = app.post("/api/v1/auth/register", &body.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_success_and_me() {
    let app = common::TestApp::new().await;
    let (email, _) = app.register_user().await;

    let login_body = json!({ "email": email, "password": "SecurePassword123!" });
    let (status, response) = app.post("/api/v1/auth/login", &login_body.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let response: serde_json::Value = serde_json::from_str(&response).unwrap();
    let token = response["access_token"].as_str().unwrap();

    let (status, me) = app.get_auth("/api/v1/auth/me", token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], email.as_str());
    assert_eq!(me["role"], "user");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_wrong_password() {
    let app = common::TestApp::new().await;
    let (email, _) = app.register_user().await;

    let login_body = json!({ "email": email, "password": "WrongPassword123!" });
    let (status, _) = app.post("/api/v1/auth/login", &login_body.to_string()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_nonexistent_user() {
    let app = common::TestApp::new().await;

    let body = json!({
        "email": unique_email("nobody"),
        "password": "SomePassword123!"
    });

    let (status, _) = app.post("/api/v1/auth/login", &body.to_string()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_locks_after_repeated_failures() {
    let app = common::TestApp::new().await;
    let (email, _) = app.register_user().await;
    let wrong = json!({ "email": email, "password": "WrongPassword123!" });

    for _ in 0..4 {
        let (status, _) = app.post("/api/v1/auth/login", &wrong.to_string()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    // The fifth failure trips the lock
    let (status, _) = app.post("/api/v1/auth/login", &wrong.to_string()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // Even the right password is refused while locked
    let right = json!({ "email": email, "password": "SecurePassword123!" });
    let (status, body) = app
        .request(Method::POST, "/api/v1/auth/login", None, Some(right))
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["error"]["retry_after"].as_u64().unwrap() > 0);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_refresh_token() {
    let app = common::TestApp::new().await;
    let body = json!({ "email": unique_email("refresh"), "password": "SecurePassword123!" });
    let (_, registered) = app.post("/api/v1/auth/register", &body.to_string()).await;
    let registered: serde_json::Value = serde_json::from_str(&registered).unwrap();

    let body = json!({ "refresh_token": registered["refresh_token"] });
    let (status, response) = app.post("/api/v1/auth/refresh", &body.to_string()).await;

    assert_eq!(status, StatusCode::OK);

    let response: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert!(!response["access_token"].as_str().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_refresh_token_invalid() {
    let app = common::TestApp::new().await;

    let body = json!({ "refresh_token": "invalid-token" });
    let (status, _) = app.post("/api/v1/auth/refresh", &body.to_string()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_forgot_password_unknown_email_is_silent() {
    let app = common::TestApp::new().await;

    let body = json!({ "email": unique_email("ghost") });
    let (status, _) = app.post("/api/v1/auth/forgot-password", &body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert!(app.sent_emails().is_empty());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_password_reset_flow() {
    let app = common::TestApp::new().await;
    let (email, _) = app.register_user().await;

    let body = json!({ "email": email });
    let (status, _) = app.post("/api/v1/auth/forgot-password", &body.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let sent = app.sent_emails();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, email);
    let token_start = sent[0].text.find("token=").unwrap() + "token=".len();
    let token = &sent[0].text[token_start..token_start + 64];

    let body = json!({ "token": token, "new_password": "BrandNewPassword456!" });
    let (status, _) = app.post("/api/v1/auth/reset-password", &body.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    // Tokens are single use
    let (status, _) = app.post("/api/v1/auth/reset-password", &body.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let login = json!({ "email": email, "password": "BrandNewPassword456!" });
    let (status, _) = app.post("/api/v1/auth/login", &login.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    // Reset email plus the change notice
    assert_eq!(app.sent_emails().len(), 2);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_protected_endpoint_with_expired_token() {
    let app = common::TestApp::new().await;

    let fake_token = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiIxMjM0NTY3ODkwIiwiZXhwIjoxfQ.invalid";

    let (status, _) = app.get_auth("/api/v1/profile", fake_token).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
