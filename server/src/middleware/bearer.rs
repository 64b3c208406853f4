//! Bearer token authentication.
//!
//! Per request:
//! 1. Read `Authorization`. If it is absent or has no non-empty second
//!    segment when split on a single space, reject with 401. The segment is
//!    taken from the raw header bytes, so a non-ASCII token still counts as
//!    present.
//! 2. Verify the token. Any failure (signature, format, algorithm, expiry)
//!    rejects with 403.
//! 3. Otherwise attach an [`Identity`] to the request extensions.
//!
//! The scheme word in front of the token is not inspected.

use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
};

use super::{Interceptor, Rejection};
use crate::auth::{Identity, TokenVerifier};

pub const MISSING_CREDENTIAL_MESSAGE: &str = "Token not provided";
pub const INVALID_CREDENTIAL_MESSAGE: &str = "Invalid or expired token";

/// Extract the token segment from the `Authorization` header.
///
/// Returns `None` for `"Bearer"` alone or `"Bearer "` with nothing after the
/// space. Bytes that are not UTF-8 are replaced, leaving a token that fails
/// verification.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<Cow<'_, str>> {
    headers
        .get(AUTHORIZATION)?
        .as_bytes()
        .split(|byte| *byte == b' ')
        .nth(1)
        .filter(|token| !token.is_empty())
        .map(String::from_utf8_lossy)
}

/// Interceptor that admits only requests carrying a valid access token.
pub struct BearerAuth {
    verifier: Arc<TokenVerifier>,
}

impl BearerAuth {
    #[must_use]
    pub const fn new(verifier: Arc<TokenVerifier>) -> Self {
        Self { verifier }
    }
}

impl Interceptor for BearerAuth {
    fn name(&self) -> &'static str {
        "bearer_auth"
    }

    fn intercept(&self, request: &mut Request) -> Result<(), Rejection> {
        let claims = {
            let Some(token) = bearer_token(request.headers()) else {
                return Err(Rejection {
                    status: StatusCode::UNAUTHORIZED,
                    message: MISSING_CREDENTIAL_MESSAGE,
                });
            };

            self.verifier.verify(&token).map_err(|e| {
                tracing::debug!(reason = %e, "bearer token failed verification");
                Rejection {
                    status: StatusCode::FORBIDDEN,
                    message: INVALID_CREDENTIAL_MESSAGE,
                }
            })?
        };

        request.extensions_mut().insert(Identity::from(claims));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{Extension, Router, body::Body, http::HeaderValue, routing::get};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::{JwtConfig, TokenIssuer};
    use crate::middleware::{Pipeline, layer};
    use crate::time::ManualTimeSource;

    const SECRET: &[u8] = b"bearer-test-secret";
    const HOUR: u64 = 60 * 60;

    struct Fixture {
        clock: Arc<ManualTimeSource>,
        issuer: TokenIssuer,
        router: Router,
        calls: Arc<AtomicUsize>,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualTimeSource::default_start());
        let config = JwtConfig::new_hs256(SECRET.to_vec()).expect("valid secret");
        let issuer = TokenIssuer::new(&config, clock.clone());
        let verifier = Arc::new(TokenVerifier::new(&config, clock.clone()));

        let calls = Arc::new(AtomicUsize::new(0));
        let handler_calls = calls.clone();
        let router = Router::new().route(
            "/whoami",
            get(move |Extension(identity): Extension<Identity>| {
                handler_calls.fetch_add(1, Ordering::SeqCst);
                async move { identity.user_id }
            }),
        );
        let router = layer(router, Pipeline::new().with(BearerAuth::new(verifier)));

        Fixture {
            clock,
            issuer,
            router,
            calls,
        }
    }

    fn request(authorization: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).expect("build request")
    }

    async fn send(router: &Router, authorization: Option<&str>) -> (StatusCode, String) {
        let response = router
            .clone()
            .oneshot(request(authorization))
            .await
            .expect("response");
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        (status, String::from_utf8(body.to_vec()).expect("utf-8 body"))
    }

    fn error_body(message: &str) -> String {
        serde_json::json!({ "error": message }).to_string()
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def.ghi"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        // Only the first space separates scheme from token.
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer  abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Token abc"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn test_bearer_token_keeps_non_ascii_segment() {
        let mut headers = HeaderMap::new();

        let utf8 = HeaderValue::from_bytes("Bearer tökén".as_bytes()).expect("opaque header");
        headers.insert(AUTHORIZATION, utf8);
        assert_eq!(bearer_token(&headers).as_deref(), Some("tökén"));

        let latin1 = HeaderValue::from_bytes(b"Bearer t\xf6k").expect("opaque header");
        headers.insert(AUTHORIZATION, latin1);
        assert_eq!(bearer_token(&headers).as_deref(), Some("t\u{fffd}k"));
    }

    #[tokio::test]
    async fn test_non_ascii_token_is_forbidden() {
        let fixture = fixture();
        let request = Request::builder()
            .uri("/whoami")
            .header(
                AUTHORIZATION,
                HeaderValue::from_bytes("Bearer tökén".as_bytes()).expect("opaque header"),
            )
            .body(Body::empty())
            .expect("build request");

        let response = fixture.router.clone().oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        assert_eq!(
            String::from_utf8(body.to_vec()).expect("utf-8 body"),
            error_body(INVALID_CREDENTIAL_MESSAGE)
        );
        assert_eq!(fixture.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let fixture = fixture();
        let token = fixture.issuer.issue("abc123").expect("issue token");

        fixture.clock.advance_secs(HOUR);
        let (status, body) = send(&fixture.router, Some(&format!("Bearer {token}"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "abc123");
        assert_eq!(fixture.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_token_is_forbidden() {
        let fixture = fixture();
        let token = fixture.issuer.issue("abc123").expect("issue token");

        fixture.clock.advance_secs(9 * HOUR);
        let (status, body) = send(&fixture.router, Some(&format!("Bearer {token}"))).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, error_body(INVALID_CREDENTIAL_MESSAGE));
        assert_eq!(fixture.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let fixture = fixture();

        let (status, body) = send(&fixture.router, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, error_body(MISSING_CREDENTIAL_MESSAGE));
        assert_eq!(fixture.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_scheme_without_token_is_unauthorized() {
        let fixture = fixture();

        for header in ["Bearer", "Bearer ", ""] {
            let (status, body) = send(&fixture.router, Some(header)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "header {header:?}");
            assert_eq!(body, error_body(MISSING_CREDENTIAL_MESSAGE));
        }
        assert_eq!(fixture.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_token_from_other_secret_is_forbidden() {
        let fixture = fixture();
        let other = JwtConfig::new_hs256(b"some-other-secret".to_vec()).expect("valid secret");
        let token = TokenIssuer::new(&other, fixture.clock.clone())
            .issue("abc123")
            .expect("issue token");

        let (status, body) = send(&fixture.router, Some(&format!("Bearer {token}"))).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, error_body(INVALID_CREDENTIAL_MESSAGE));
        assert_eq!(fixture.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_garbage_token_is_forbidden_and_not_echoed() {
        let fixture = fixture();

        let (status, body) = send(&fixture.router, Some("Bearer garbage-token-value")).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(!body.contains("garbage-token-value"));
        assert!(!body.contains("bearer-test-secret"));
    }

    #[tokio::test]
    async fn test_same_token_twice_yields_same_identity() {
        let fixture = fixture();
        let token = fixture.issuer.issue("abc123").expect("issue token");
        let header = format!("Bearer {token}");

        let first = send(&fixture.router, Some(&header)).await;
        let second = send(&fixture.router, Some(&header)).await;

        assert_eq!(first, second);
        assert_eq!(first.0, StatusCode::OK);
        assert_eq!(fixture.calls.load(Ordering::SeqCst), 2);
    }
}
