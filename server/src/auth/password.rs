//! Password hashing with bcrypt.
//!
//! Plaintext passwords are never stored; accounts keep only the salted
//! bcrypt hash produced here.

/// Lowest cost bcrypt accepts.
pub const MIN_BCRYPT_COST: u32 = 4;
/// Highest cost bcrypt accepts.
pub const MAX_BCRYPT_COST: u32 = 31;

/// Error returned when hashing or comparing a password fails.
#[derive(Debug)]
pub enum PasswordError {
    /// bcrypt rejected the input or the stored hash.
    Bcrypt(String),
}

impl std::fmt::Display for PasswordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bcrypt(reason) => write!(f, "bcrypt error: {reason}"),
        }
    }
}

impl std::error::Error for PasswordError {}

impl From<bcrypt::BcryptError> for PasswordError {
    fn from(e: bcrypt::BcryptError) -> Self {
        Self::Bcrypt(e.to_string())
    }
}

/// Hashes and checks passwords at a fixed bcrypt cost.
///
/// Both operations are CPU-bound; async callers run them on the blocking pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Cost used when none is configured.
    pub const DEFAULT_COST: u32 = 10;

    /// Create a hasher with the given cost, clamped to bcrypt's accepted range.
    #[must_use]
    pub const fn new(cost: u32) -> Self {
        let cost = if cost < MIN_BCRYPT_COST {
            MIN_BCRYPT_COST
        } else if cost > MAX_BCRYPT_COST {
            MAX_BCRYPT_COST
        } else {
            cost
        };
        Self { cost }
    }

    #[must_use]
    pub const fn cost(self) -> u32 {
        self.cost
    }

    /// Hash `password` with a fresh random salt.
    ///
    /// # Errors
    /// Returns `PasswordError` if bcrypt fails.
    pub fn hash(self, password: &str) -> Result<String, PasswordError> {
        Ok(bcrypt::hash(password, self.cost)?)
    }

    /// Check `password` against a stored bcrypt hash.
    ///
    /// # Errors
    /// Returns `PasswordError` if the stored hash is not a valid bcrypt hash.
    pub fn verify(self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        Ok(bcrypt::verify(password, hash)?)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new(MIN_BCRYPT_COST);
        let hash = hasher.hash("correct horse").expect("hash password");

        assert_ne!(hash, "correct horse");
        assert!(hasher.verify("correct horse", &hash).expect("verify"));
        assert!(!hasher.verify("battery staple", &hash).expect("verify"));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = PasswordHasher::new(MIN_BCRYPT_COST);
        let first = hasher.hash("same-password").expect("hash password");
        let second = hasher.hash("same-password").expect("hash password");

        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_invalid_hash() {
        let hasher = PasswordHasher::new(MIN_BCRYPT_COST);
        assert!(matches!(
            hasher.verify("password", "not-a-bcrypt-hash"),
            Err(PasswordError::Bcrypt(_))
        ));
    }

    #[test]
    fn test_cost_is_clamped() {
        assert_eq!(PasswordHasher::new(1).cost(), MIN_BCRYPT_COST);
        assert_eq!(PasswordHasher::new(99).cost(), MAX_BCRYPT_COST);
        assert_eq!(PasswordHasher::default().cost(), 10);
    }
}
