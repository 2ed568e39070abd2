use bcrypt::{hash, verify, DEFAULT_COST};
use sb_shared::validation::validate_password_strength;

use crate::errors::{AuthError, DomainError};

/// bcrypt wrapper
#[derive(Debug, Clone, Copy)]
pub struct PasswordService {
    cost: u32,
}

impl Default for PasswordService {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordService {
    /// Use a lower cost in tests; bcrypt's minimum is 4
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String, DomainError> {
        hash(password, self.cost)
            .map_err(|e| DomainError::internal(format!("Password hashing failed: {}", e)))
    }

    /// Malformed hashes count as a mismatch
    pub fn verify(&self, password: &str, password_hash: &str) -> bool {
        verify(password, password_hash).unwrap_or(false)
    }

    pub fn validate(&self, password: &str) -> Result<(), DomainError> {
        let errors = validate_password_strength(password);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AuthError::WeakPassword { errors }.into())
        }
    }
}
