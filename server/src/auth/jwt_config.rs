//! Shared-secret configuration for access tokens.
//!
//! # Pre-conditions
//! - The secret must be non-empty.
//!
//! # Post-conditions
//! - `JwtConfig` instances are immutable once created.
//!
//! # Invariants
//! - The issuer and the verifier are built from the same `JwtConfig`, so they
//!   always agree on the secret.
//! - The secret never appears in `Debug` output.

/// Lifetime of an access token, in seconds (8 hours).
pub const TOKEN_LIFETIME_SECS: u64 = 8 * 60 * 60;

/// Error returned when JWT configuration is invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JwtConfigError {
    /// The HS256 secret is empty.
    EmptySecret,
}

impl std::fmt::Display for JwtConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySecret => write!(f, "HS256 secret must not be empty"),
        }
    }
}

impl std::error::Error for JwtConfigError {}

/// HS256 signing/verification configuration.
///
/// Uses one shared secret for both signing and verification. Rotating the
/// secret invalidates every token issued under the previous one.
#[derive(Clone, PartialEq, Eq)]
pub struct JwtConfig {
    secret: Vec<u8>,
    token_lifetime_secs: u64,
}

impl JwtConfig {
    /// Create a new HS256 configuration with the standard 8 hour token lifetime.
    ///
    /// # Errors
    /// Returns `JwtConfigError::EmptySecret` if the secret is empty.
    pub fn new_hs256(secret: Vec<u8>) -> Result<Self, JwtConfigError> {
        if secret.is_empty() {
            return Err(JwtConfigError::EmptySecret);
        }
        Ok(Self {
            secret,
            token_lifetime_secs: TOKEN_LIFETIME_SECS,
        })
    }

    /// The shared secret.
    #[must_use]
    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    /// How long an issued token stays valid, in seconds.
    #[must_use]
    pub const fn token_lifetime_secs(&self) -> u64 {
        self.token_lifetime_secs
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("token_lifetime_secs", &self.token_lifetime_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_hs256_valid() {
        let config = JwtConfig::new_hs256(b"my-secret-key".to_vec()).expect("valid secret");
        assert_eq!(config.secret(), b"my-secret-key");
        assert_eq!(config.token_lifetime_secs(), 28_800);
    }

    #[test]
    fn test_new_hs256_empty_secret() {
        let result = JwtConfig::new_hs256(Vec::new());
        assert!(matches!(result, Err(JwtConfigError::EmptySecret)));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = JwtConfig::new_hs256(b"super-secret-value".to_vec()).expect("valid secret");
        let rendered = format!("{config:?}");

        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("super-secret-value"));
    }

    #[test]
    fn test_jwt_config_clone() {
        let config = JwtConfig::new_hs256(b"secret".to_vec()).expect("valid secret");
        assert_eq!(config.clone(), config);
    }

    #[test]
    fn test_jwt_config_error_display() {
        assert_eq!(
            JwtConfigError::EmptySecret.to_string(),
            "HS256 secret must not be empty"
        );
    }
}
