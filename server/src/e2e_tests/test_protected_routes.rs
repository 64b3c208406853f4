//! End-to-end tests for the bearer-token boundary on protected routes.
//!
//! These tests verify:
//! 1. Every protected route answers 401 without a token
//! 2. Expired, foreign and garbage tokens answer 403
//! 3. A token issued at T works at T+1h and is rejected at T+9h

use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::auth::{JwtConfig, TokenIssuer};
use crate::e2e_tests::helpers::{HOUR, TestApp, bearer};

const PROTECTED: [&str; 3] = ["/api/me", "/api/dashboard", "/api/servicos"];

#[tokio::test]
async fn test_missing_token_is_unauthorized_everywhere() {
    let app = TestApp::new();

    for uri in PROTECTED {
        let (status, body) = app.get(uri, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body, json!({ "error": "Token not provided" }), "{uri}");
    }
}

#[tokio::test]
async fn test_scheme_without_token_is_unauthorized() {
    let app = TestApp::new();

    let (status, body) = app
        .send(Method::GET, "/api/me", Some("Bearer"), None)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Token not provided" }));
}

#[tokio::test]
async fn test_protected_post_rejected_before_body_is_used() {
    let app = TestApp::new();
    let (id, token) = app.sign_up("ana@example.com").await;

    let (status, _) = app
        .post(
            "/api/servicos",
            None,
            json!({ "nome": "Corte", "user_id": id }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.get("/api/servicos", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_token_lifetime_scenario() {
    let app = TestApp::new();
    let (id, token) = app.sign_up("ana@example.com").await;

    app.clock.advance_secs(HOUR);
    let (status, body) = app.get("/api/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], id.as_str());

    app.clock.advance_secs(8 * HOUR);
    let (status, body) = app.get("/api/me", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "error": "Invalid or expired token" }));
}

#[tokio::test]
async fn test_token_from_other_secret_is_forbidden() {
    let app = TestApp::new();
    let other = JwtConfig::new_hs256(b"not-the-server-secret".to_vec()).expect("valid secret");
    let forged = TokenIssuer::new(&other, app.clock.clone())
        .issue("abc123")
        .expect("issue token");

    for uri in PROTECTED {
        let (status, body) = app.get(uri, Some(&forged)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body, json!({ "error": "Invalid or expired token" }), "{uri}");
    }
}

#[tokio::test]
async fn test_garbage_token_is_forbidden() {
    let app = TestApp::new();

    let (status, body) = app
        .send(Method::GET, "/api/dashboard", Some(&bearer("abc.def.ghi")), None)
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "error": "Invalid or expired token" }));
}

#[tokio::test]
async fn test_token_survives_repeated_use() {
    let app = TestApp::new();
    let (_, token) = app.sign_up("ana@example.com").await;

    let first = app.get("/api/me", Some(&token)).await;
    let second = app.get("/api/me", Some(&token)).await;

    assert_eq!(first.0, StatusCode::OK);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_public_routes_ignore_bad_tokens() {
    let app = TestApp::new();

    let (status, _) = app.get("/health", Some("garbage")).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new();

    let (status, _) = app.get("/api/nowhere", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
