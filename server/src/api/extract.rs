//! Request body extraction.
//!
//! [`JsonBody`] reads a JSON body and turns every failure into an
//! [`ApiError::BadRequest`], so clients always see the
//! `{"success": false, "error": ...}` shape.
//!
//! A request with no body, or whose `Content-Type` is not JSON, is read as
//! `{}`. Handlers then report the missing fields themselves.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{HeaderMap, header::CONTENT_TYPE},
};
use serde::de::DeserializeOwned;

use super::ApiError;

pub const INVALID_BODY: &str = "Request body must be valid JSON";

const EMPTY_OBJECT: &[u8] = b"{}";

/// JSON request body with API-shaped rejections.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

fn has_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::trim)
        .is_some_and(|mime| mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json"))
}

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = has_json_content_type(request.headers());
        let bytes = Bytes::from_request(request, state).await.map_err(|e| {
            tracing::debug!(error = %e, "failed to read request body");
            ApiError::BadRequest(INVALID_BODY)
        })?;

        let raw: &[u8] = if is_json && !bytes.is_empty() {
            &bytes
        } else {
            EMPTY_OBJECT
        };

        serde_json::from_slice(raw).map(Self).map_err(|e| {
            tracing::debug!(error = %e, "request body is not valid JSON");
            ApiError::BadRequest(INVALID_BODY)
        })
    }
}
