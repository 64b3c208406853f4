//! Request interceptors.
//!
//! An [`Interceptor`] inspects a request before it reaches a handler and
//! either lets it through (possibly after attaching data to its extensions)
//! or rejects it with a terminal response. A [`Pipeline`] runs interceptors
//! in the order they were added and stops at the first rejection.
//!
//! The pipeline is mounted on a router with [`layer`], which wraps it in an
//! axum route layer so unmatched paths still 404 instead of being rejected.
//!
//! # Invariants
//! - A rejected request never reaches the next interceptor or the handler.
//! - Rejection bodies are `{"error": "<message>"}`.

mod bearer;

pub use bearer::{BearerAuth, INVALID_CREDENTIAL_MESSAGE, MISSING_CREDENTIAL_MESSAGE, bearer_token};

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{Next, from_fn_with_state},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Terminal response produced by an interceptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub status: StatusCode,
    pub message: &'static str,
}

#[derive(Serialize)]
struct RejectionBody {
    error: &'static str,
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (self.status, Json(RejectionBody { error: self.message })).into_response()
    }
}

/// A single stage of request processing that runs before the handler.
pub trait Interceptor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Inspect `request`, attaching whatever later stages need.
    ///
    /// # Errors
    /// Returns the `Rejection` to send instead of continuing.
    fn intercept(&self, request: &mut Request) -> Result<(), Rejection>;
}

/// Ordered list of interceptors.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Interceptor>>,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an interceptor; it runs after every stage added before it.
    #[must_use]
    pub fn with(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.stages.push(Box::new(interceptor));
        self
    }

    /// Run every stage in order, stopping at the first rejection.
    ///
    /// # Errors
    /// Returns the first stage's `Rejection`.
    pub fn apply(&self, request: &mut Request) -> Result<(), Rejection> {
        for stage in &self.stages {
            if let Err(rejection) = stage.intercept(request) {
                tracing::debug!(
                    interceptor = stage.name(),
                    status = rejection.status.as_u16(),
                    path = %request.uri().path(),
                    "request rejected"
                );
                return Err(rejection);
            }
        }
        Ok(())
    }
}

/// axum middleware body: run the pipeline, then the handler if nothing rejected.
async fn run_pipeline(
    State(pipeline): State<Arc<Pipeline>>,
    mut request: Request,
    next: Next,
) -> Response {
    match pipeline.apply(&mut request) {
        Ok(()) => next.run(request).await,
        Err(rejection) => rejection.into_response(),
    }
}

/// Guard every route currently in `router` with `pipeline`.
pub fn layer<S>(router: Router<S>, pipeline: Pipeline) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(from_fn_with_state(Arc::new(pipeline), run_pipeline))
}
