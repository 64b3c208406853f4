//! HTTP API.
//!
//! Public routes: `/health`, `/api/register`, `/api/login`.
//! Protected routes (bearer token required): `/api/me`, `/api/dashboard`,
//! `/api/servicos/...`.
//!
//! # Invariants
//! - Every protected route sits behind the bearer-auth pipeline, which runs
//!   before the handler and short-circuits on failure.
//! - Handlers never re-verify tokens; they trust the attached `Identity`.

pub mod auth;
pub mod dashboard;
pub mod extract;
pub mod response;
pub mod services;

pub use extract::JsonBody;
pub use response::ApiError;

use std::sync::Arc;

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{JwtConfig, PasswordHasher, TokenIssuer, TokenVerifier};
use crate::middleware::{self, BearerAuth, Pipeline};
use crate::store::DataStore;
use crate::time::TimeSource;

/// State shared by all handlers.
///
/// The issuer and verifier are built from one `JwtConfig` and one clock.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DataStore>,
    pub issuer: Arc<TokenIssuer>,
    pub verifier: Arc<TokenVerifier>,
    pub passwords: PasswordHasher,
    pub clock: Arc<dyn TimeSource>,
}

impl AppState {
    #[must_use]
    pub fn new(
        jwt: &JwtConfig,
        passwords: PasswordHasher,
        store: Arc<dyn DataStore>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            store,
            issuer: Arc::new(TokenIssuer::new(jwt, Arc::clone(&clock))),
            verifier: Arc::new(TokenVerifier::new(jwt, Arc::clone(&clock))),
            passwords,
            clock,
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let pipeline = Pipeline::new().with(BearerAuth::new(Arc::clone(&state.verifier)));

    let protected = Router::new()
        .route("/api/me", get(auth::me))
        .route("/api/dashboard", get(dashboard::summary))
        .nest("/api/servicos", services::router());
    let protected = middleware::layer(protected, pipeline);

    Router::new()
        .route("/health", get(health))
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
