//! Server configuration module.
//!
//! Configuration is read once at startup from environment variables and then
//! passed explicitly to whatever needs it. Nothing reads the environment
//! while serving requests.
//!
//! # Environment Variables
//!
//! - `AGENDIFY_JWT_SECRET`: Shared secret for signing and verifying access
//!   tokens. If unset, a development-only default is used and a warning is
//!   logged; every production deployment must set it.
//! - `AGENDIFY_LISTEN_HOST`: Address to bind (default: `127.0.0.1`)
//! - `AGENDIFY_LISTEN_PORT`: Port to listen on (default: `3000`)
//! - `AGENDIFY_BCRYPT_COST`: bcrypt cost for new password hashes (default: `10`)
//!
//! # Invariants
//!
//! - `jwt` always holds a non-empty secret
//! - `listen_port` is always a valid port number
//! - `bcrypt_cost` is always within bcrypt's accepted range (4-31)

use std::net::{IpAddr, Ipv4Addr};

use crate::auth::password::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::auth::{JwtConfig, PasswordHasher};

pub const JWT_SECRET_VAR: &str = "AGENDIFY_JWT_SECRET";
pub const LISTEN_HOST_VAR: &str = "AGENDIFY_LISTEN_HOST";
pub const LISTEN_PORT_VAR: &str = "AGENDIFY_LISTEN_PORT";
pub const BCRYPT_COST_VAR: &str = "AGENDIFY_BCRYPT_COST";

/// Where the JWT secret came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    /// Read from `AGENDIFY_JWT_SECRET`.
    Environment,
    /// `AGENDIFY_JWT_SECRET` was unset; the built-in development secret is in use.
    DevelopmentDefault,
}

/// Server configuration.
///
/// # Post-conditions
///
/// When constructed via `from_env()`:
/// - `jwt` carries a non-empty secret
/// - `secret_source` records whether the development fallback is in use
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Token signing/verification configuration shared by issuer and verifier.
    pub jwt: JwtConfig,
    pub secret_source: SecretSource,
    pub listen_host: IpAddr,
    pub listen_port: u16,
    pub bcrypt_cost: u32,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl ServerConfig {
    /// Default port for the server.
    pub const DEFAULT_PORT: u16 = 3000;
    /// Default bind address.
    pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
    /// Secret used when `AGENDIFY_JWT_SECRET` is unset. Local development only.
    pub const DEVELOPMENT_JWT_SECRET: &'static str = "agendify-development-secret-do-not-deploy";

    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `AGENDIFY_JWT_SECRET` is set but empty
    /// - `AGENDIFY_LISTEN_HOST` is set but not an IP address
    /// - `AGENDIFY_LISTEN_PORT` is set but not a valid port number
    /// - `AGENDIFY_BCRYPT_COST` is set but not an integer in 4-31
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Same as [`ServerConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (jwt, secret_source) = Self::load_jwt(&lookup)?;
        let listen_host = Self::load_listen_host(&lookup)?;
        let listen_port = Self::load_listen_port(&lookup)?;
        let bcrypt_cost = Self::load_bcrypt_cost(&lookup)?;

        Ok(Self {
            jwt,
            secret_source,
            listen_host,
            listen_port,
            bcrypt_cost,
        })
    }

    /// Password hasher configured with `bcrypt_cost`.
    #[must_use]
    pub const fn password_hasher(&self) -> PasswordHasher {
        PasswordHasher::new(self.bcrypt_cost)
    }

    /// Load the JWT secret, falling back to the development default.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is set but empty.
    fn load_jwt<F>(lookup: &F) -> Result<(JwtConfig, SecretSource), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (secret, source) = lookup(JWT_SECRET_VAR).map_or_else(
            || {
                (
                    Self::DEVELOPMENT_JWT_SECRET.to_string(),
                    SecretSource::DevelopmentDefault,
                )
            },
            |secret| (secret, SecretSource::Environment),
        );

        let jwt = JwtConfig::new_hs256(secret.into_bytes()).map_err(|e| {
            ConfigError::InvalidValue {
                name: JWT_SECRET_VAR.to_string(),
                message: e.to_string(),
            }
        })?;
        Ok((jwt, source))
    }

    /// Load the bind address. Returns the default if not set.
    fn load_listen_host<F>(lookup: &F) -> Result<IpAddr, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(LISTEN_HOST_VAR) {
            Some(value) => value.parse::<IpAddr>().map_err(|_| ConfigError::InvalidValue {
                name: LISTEN_HOST_VAR.to_string(),
                message: format!("'{value}' is not a valid IP address"),
            }),
            None => Ok(Self::DEFAULT_HOST),
        }
    }

    /// Load the listen port. Returns the default if not set.
    fn load_listen_port<F>(lookup: &F) -> Result<u16, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(LISTEN_PORT_VAR) {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: LISTEN_PORT_VAR.to_string(),
                message: format!("'{value}' is not a valid port number (must be 1-65535)"),
            }),
            None => Ok(Self::DEFAULT_PORT),
        }
    }

    /// Load the bcrypt cost. Returns the default if not set.
    fn load_bcrypt_cost<F>(lookup: &F) -> Result<u32, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(value) = lookup(BCRYPT_COST_VAR) else {
            return Ok(PasswordHasher::DEFAULT_COST);
        };
        match value.parse::<u32>() {
            Ok(cost) if (MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) => Ok(cost),
            _ => Err(ConfigError::InvalidValue {
                name: BCRYPT_COST_VAR.to_string(),
                message: format!(
                    "'{value}' is not a valid bcrypt cost (must be {MIN_BCRYPT_COST}-{MAX_BCRYPT_COST})"
                ),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = load(&[]).expect("defaults load");

        assert_eq!(config.listen_port, 3000);
        assert_eq!(config.listen_host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.bcrypt_cost, 10);
        assert_eq!(config.secret_source, SecretSource::DevelopmentDefault);
        assert_eq!(
            config.jwt.secret(),
            ServerConfig::DEVELOPMENT_JWT_SECRET.as_bytes()
        );
    }

    #[test]
    fn test_secret_from_environment() {
        let config = load(&[(JWT_SECRET_VAR, "prod-secret")]).expect("config loads");

        assert_eq!(config.secret_source, SecretSource::Environment);
        assert_eq!(config.jwt.secret(), b"prod-secret");
    }

    #[test]
    fn test_empty_secret_rejected() {
        let error = load(&[(JWT_SECRET_VAR, "")]).expect_err("empty secret");

        assert_eq!(
            error,
            ConfigError::InvalidValue {
                name: JWT_SECRET_VAR.to_string(),
                message: "HS256 secret must not be empty".to_string(),
            }
        );
    }

    #[test]
    fn test_debug_does_not_print_secret() {
        let config = load(&[(JWT_SECRET_VAR, "prod-secret")]).expect("config loads");
        assert!(!format!("{config:?}").contains("prod-secret"));
    }

    #[test]
    fn test_listen_overrides() {
        let config = load(&[(LISTEN_HOST_VAR, "0.0.0.0"), (LISTEN_PORT_VAR, "8080")])
            .expect("config loads");

        assert_eq!(config.listen_host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.listen_port, 8080);
    }

    #[test]
    fn test_invalid_port() {
        let error = load(&[(LISTEN_PORT_VAR, "70000")]).expect_err("invalid port");
        assert!(matches!(error, ConfigError::InvalidValue { ref name, .. } if name == LISTEN_PORT_VAR));
    }

    #[test]
    fn test_invalid_host() {
        let error = load(&[(LISTEN_HOST_VAR, "localhost")]).expect_err("invalid host");
        assert!(matches!(error, ConfigError::InvalidValue { ref name, .. } if name == LISTEN_HOST_VAR));
    }

    #[test]
    fn test_bcrypt_cost_bounds() {
        assert_eq!(load(&[(BCRYPT_COST_VAR, "4")]).expect("min cost").bcrypt_cost, 4);
        assert!(load(&[(BCRYPT_COST_VAR, "3")]).is_err());
        assert!(load(&[(BCRYPT_COST_VAR, "32")]).is_err());
        assert!(load(&[(BCRYPT_COST_VAR, "ten")]).is_err());
    }

    #[test]
    fn test_config_error_display_invalid() {
        let error = ConfigError::InvalidValue {
            name: "TEST_VAR".to_string(),
            message: "bad value".to_string(),
        };
        assert_eq!(error.to_string(), "invalid value for TEST_VAR: bad value");
    }
}
