//! End-to-end tests for registration and login.
//!
//! These tests verify:
//! 1. Registration validates input and rejects duplicate emails
//! 2. Passwords are stored hashed
//! 3. Login issues a token that opens protected routes
//! 4. Wrong credentials are indistinguishable from unknown accounts

use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::e2e_tests::helpers::TestApp;
use crate::store::DataStore;

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new();

    let (status, body) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn test_register_returns_account_without_password() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/register",
            None,
            json!({
                "name": "Ana",
                "email": "ana@example.com",
                "password": "hunter22",
                "company_name": "Ana Hair",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["name"], "Ana");
    assert_eq!(body["user"]["email"], "ana@example.com");
    assert_eq!(body["user"]["company_name"], "Ana Hair");
    assert!(body["user"]["id"].is_string());
    assert!(body.to_string().find("hunter22").is_none());
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_stores_only_a_hash() {
    let app = TestApp::new();
    app.register("ana@example.com", "hunter22").await;

    let account = app
        .store
        .find_account_by_email("ana@example.com")
        .expect("lookup")
        .expect("account stored");

    assert_ne!(account.password_hash, "hunter22");
    assert!(account.password_hash.starts_with("$2"));
}

#[tokio::test]
async fn test_register_requires_every_field() {
    let app = TestApp::new();
    let complete = json!({
        "name": "Ana",
        "email": "ana@example.com",
        "password": "hunter22",
        "company_name": "Ana Hair",
    });

    for field in ["name", "email", "password", "company_name"] {
        let mut missing = complete.clone();
        missing
            .as_object_mut()
            .expect("object body")
            .remove(field);
        let (status, body) = app.post("/api/register", None, missing).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "without {field}");
        assert_eq!(body["success"], false);

        let mut empty = complete.clone();
        empty[field] = json!("");
        let (status, _) = app.post("/api/register", None, empty).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "empty {field}");
    }
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let app = TestApp::new();
    app.register("ana@example.com", "hunter22").await;

    let (status, body) = app
        .post(
            "/api/register",
            None,
            json!({
                "name": "Other Ana",
                "email": "ana@example.com",
                "password": "different",
                "company_name": "Elsewhere",
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already registered");
}

#[tokio::test]
async fn test_login_returns_token_and_user() {
    let app = TestApp::new();
    let id = app.register("ana@example.com", "hunter22").await;

    let (status, body) = app
        .post(
            "/api/login",
            None,
            json!({ "email": "ana@example.com", "password": "hunter22" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["id"], id.as_str());
    assert_eq!(body["user"]["email"], "ana@example.com");
    assert_eq!(body["token"].as_str().expect("token").split('.').count(), 3);
}

#[tokio::test]
async fn test_login_token_opens_me() {
    let app = TestApp::new();
    let (id, token) = app.sign_up("ana@example.com").await;

    let (status, body) = app.get("/api/me", Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], id.as_str());
    assert_eq!(body["message"], format!("Authenticated user: {id}"));
}

#[tokio::test]
async fn test_login_wrong_password_and_unknown_email_match() {
    let app = TestApp::new();
    app.register("ana@example.com", "hunter22").await;

    let wrong_password = app
        .post(
            "/api/login",
            None,
            json!({ "email": "ana@example.com", "password": "nope" }),
        )
        .await;
    let unknown_email = app
        .post(
            "/api/login",
            None,
            json!({ "email": "ghost@example.com", "password": "hunter22" }),
        )
        .await;

    assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password.1["error"], "Invalid email or password");
}

#[tokio::test]
async fn test_login_requires_email_and_password() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/api/login", None, json!({ "email": "ana@example.com" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email and password are required");
}

#[tokio::test]
async fn test_login_without_body_reports_missing_fields() {
    let app = TestApp::new();
    let expected = json!({
        "success": false,
        "error": "Email and password are required",
    });

    for content_type in [None, Some("application/json"), Some("text/plain")] {
        let (status, body) = app
            .send_raw(Method::POST, "/api/login", None, content_type, String::new())
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{content_type:?}");
        assert_eq!(body, expected, "{content_type:?}");
    }
}

#[tokio::test]
async fn test_login_malformed_body_is_json_bad_request() {
    let app = TestApp::new();

    let (status, body) = app
        .send_raw(
            Method::POST,
            "/api/login",
            None,
            Some("application/json"),
            "{not json".to_string(),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "success": false, "error": "Request body must be valid JSON" })
    );
}
