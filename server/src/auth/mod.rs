//! Authentication module.
//!
//! Token issuance and verification, the shared-secret configuration they
//! both read, and password hashing for stored accounts.
//!
//! # Pre-conditions
//! - A single `JwtConfig` is built at startup and handed to both the issuer
//!   and the verifier.
//!
//! # Post-conditions
//! - Authentication configuration is immutable once loaded.
//!
//! # Invariants
//! - The shared secret is never logged or returned to clients.

pub mod identity;
pub mod jwt;
pub mod jwt_config;
pub mod password;

pub use identity::Identity;
pub use jwt::{Claims, JwtError, TokenIssuer, TokenVerifier};
pub use jwt_config::{JwtConfig, JwtConfigError, TOKEN_LIFETIME_SECS};
pub use password::{PasswordError, PasswordHasher};
