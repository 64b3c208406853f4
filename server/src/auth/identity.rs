//! Per-request authenticated identity.

use super::Claims;

/// Identity attached to a request once its bearer token has been verified.
///
/// Protected handlers take the account id from here and nowhere else;
/// ids supplied in request bodies or query strings are never trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Account identifier from the token's `userId` claim.
    pub user_id: String,
    /// Issued-at, seconds since Unix epoch.
    pub issued_at: u64,
    /// Expiry, seconds since Unix epoch.
    pub expires_at: u64,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            issued_at: claims.iat,
            expires_at: claims.exp,
        }
    }
}
