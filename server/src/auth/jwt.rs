//! Access token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying `{ "userId", "iat", "exp" }` with
//! `exp = iat + 8h`.
//!
//! # Pre-conditions
//! - `TokenIssuer` and `TokenVerifier` are built from the same `JwtConfig`
//!   and the same `TimeSource`.
//!
//! # Post-conditions
//! - `TokenVerifier::verify` returns claims only for tokens that were signed
//!   with the configured secret and have not yet expired.
//!
//! # Invariants
//! - Issuance and verification are stateless. No token registry exists, so
//!   a token is valid until it expires or the secret rotates.
//! - Expiry is judged against the injected clock, never the system clock.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::JwtConfig;
use crate::time::TimeSource;

/// Decoded payload of an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Identifier of the account the token was issued to.
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Issued-at, seconds since Unix epoch.
    pub iat: u64,
    /// Expiry, seconds since Unix epoch.
    pub exp: u64,
}

/// Error returned when issuing or verifying a JWT fails.
#[derive(Debug)]
pub enum JwtError {
    /// The JWT signature is invalid.
    InvalidSignature,
    /// The JWT has expired.
    TokenExpired,
    /// The JWT is malformed, uses another algorithm, or cannot be parsed.
    MalformedToken,
    /// The `userId` claim is empty.
    MissingUserId,
    /// Signing the token failed.
    Encoding(String),
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSignature => write!(f, "invalid JWT signature"),
            Self::TokenExpired => write!(f, "JWT has expired"),
            Self::MalformedToken => write!(f, "malformed JWT"),
            Self::MissingUserId => write!(f, "missing 'userId' claim in JWT"),
            Self::Encoding(reason) => write!(f, "failed to sign JWT: {reason}"),
        }
    }
}

impl std::error::Error for JwtError {}

/// Mints signed access tokens for verified accounts.
pub struct TokenIssuer {
    key: EncodingKey,
    header: Header,
    lifetime_secs: u64,
    clock: Arc<dyn TimeSource>,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(config: &JwtConfig, clock: Arc<dyn TimeSource>) -> Self {
        Self {
            key: EncodingKey::from_secret(config.secret()),
            header: Header::new(Algorithm::HS256),
            lifetime_secs: config.token_lifetime_secs(),
            clock,
        }
    }

    /// Issue a token for `user_id`, valid from now for the configured lifetime.
    ///
    /// # Pre-conditions
    /// - The caller has already verified the account's credentials.
    ///
    /// # Errors
    /// Returns `JwtError::Encoding` if signing fails.
    pub fn issue(&self, user_id: &str) -> Result<String, JwtError> {
        let iat = self.clock.now_secs();
        let claims = Claims {
            user_id: user_id.to_string(),
            iat,
            exp: iat.saturating_add(self.lifetime_secs),
        };

        encode(&self.header, &claims, &self.key).map_err(|e| JwtError::Encoding(e.to_string()))
    }
}

/// Verifies access tokens and exposes their claims.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn TimeSource>,
}

impl TokenVerifier {
    #[must_use]
    pub fn new(config: &JwtConfig, clock: Arc<dyn TimeSource>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` stays required; it is compared against the injected clock below.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            key: DecodingKey::from_secret(config.secret()),
            validation,
            clock,
        }
    }

    /// Verify a token's signature and expiry and return its claims.
    ///
    /// A token is expired once `now >= exp`.
    ///
    /// # Errors
    /// Returns `JwtError` describing why the token was rejected.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let token_data =
            decode::<Claims>(token, &self.key, &self.validation).map_err(map_jwt_error)?;
        let claims = token_data.claims;

        if self.clock.now_secs() >= claims.exp {
            return Err(JwtError::TokenExpired);
        }
        if claims.user_id.is_empty() {
            return Err(JwtError::MissingUserId);
        }

        Ok(claims)
    }
}

/// Maps jsonwebtoken errors to our `JwtError` type.
fn map_jwt_error(error: jsonwebtoken::errors::Error) -> JwtError {
    use jsonwebtoken::errors::ErrorKind;

    match error.kind() {
        ErrorKind::InvalidSignature => JwtError::InvalidSignature,
        ErrorKind::ExpiredSignature => JwtError::TokenExpired,
        _ => JwtError::MalformedToken,
    }
}
