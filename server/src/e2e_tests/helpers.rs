//! Common helpers for end-to-end tests.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

use crate::api::{AppState, router};
use crate::auth::password::MIN_BCRYPT_COST;
use crate::auth::{JwtConfig, PasswordHasher};
use crate::store::InMemoryStore;
use crate::time::ManualTimeSource;

pub const SECRET: &[u8] = b"e2e-test-secret";
pub const HOUR: u64 = 60 * 60;

/// A router wired to its own store and clock.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<ManualTimeSource>,
}

impl TestApp {
    /// Fresh app with the clock at 2023-11-14T22:13:20Z.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(ManualTimeSource::default_start())
    }

    #[must_use]
    pub fn with_clock(clock: ManualTimeSource) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(clock);
        let jwt = JwtConfig::new_hs256(SECRET.to_vec()).expect("valid secret");
        let state = AppState::new(
            &jwt,
            PasswordHasher::new(MIN_BCRYPT_COST),
            store.clone(),
            clock.clone(),
        );

        Self {
            router: router(state),
            store,
            clock,
        }
    }

    /// Send a request and return the status and JSON body (`Null` if empty).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        match body {
            Some(json) => {
                self.send_raw(
                    method,
                    uri,
                    authorization,
                    Some("application/json"),
                    json.to_string(),
                )
                .await
            }
            None => {
                self.send_raw(method, uri, authorization, None, String::new())
                    .await
            }
        }
    }

    /// Send `body` as-is with an optional `Content-Type`.
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        content_type: Option<&str>,
        body: String,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        if let Some(value) = content_type {
            builder = builder.header(header::CONTENT_TYPE, value);
        }

        let response = self
            .router
            .clone()
            .oneshot(builder.body(Body::from(body)).expect("build request"))
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON response body")
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let authorization = token.map(bearer);
        self.send(Method::GET, uri, authorization.as_deref(), None)
            .await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let authorization = token.map(bearer);
        self.send(Method::POST, uri, authorization.as_deref(), Some(body))
            .await
    }

    /// Register an account and return its id.
    pub async fn register(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .post(
                "/api/register",
                None,
                serde_json::json!({
                    "name": "Test User",
                    "email": email,
                    "password": password,
                    "company_name": "Test Salon",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        body["user"]["id"].as_str().expect("user id").to_string()
    }

    /// Log in and return the access token.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .post(
                "/api/login",
                None,
                serde_json::json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().expect("token").to_string()
    }

    /// Register and log in; returns `(account id, token)`.
    pub async fn sign_up(&self, email: &str) -> (String, String) {
        let id = self.register(email, "s3cret-pass").await;
        let token = self.login(email, "s3cret-pass").await;
        (id, token)
    }
}

/// `Authorization` header value for `token`.
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
