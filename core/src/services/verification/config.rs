//! Configuration for the verification service

use crate::domain::entities::verification_token::DEFAULT_EXPIRATION_HOURS;

/// Configuration for the verification service
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// Hours before a code expires
    pub code_expiration_hours: i64,
    /// Minimum seconds between two codes of the same purpose
    pub resend_cooldown_seconds: i64,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self {
            code_expiration_hours: DEFAULT_EXPIRATION_HOURS,
            resend_cooldown_seconds: 300,
        }
    }
}
