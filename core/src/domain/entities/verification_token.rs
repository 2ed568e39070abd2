//! Emailed one-time codes bound to a single purpose.

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::AuthError;

/// Maximum number of verification attempts allowed
pub const MAX_ATTEMPTS: i32 = 3;

/// Length of the verification code
pub const CODE_LENGTH: usize = 6;

/// Default lifetime of an emailed code (24 hours)
pub const DEFAULT_EXPIRATION_HOURS: i64 = 24;

/// The action a code authorizes. A code never works for another purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    EmailVerification,
    PasswordReset,
    Login2fa,
    AccountChange,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::EmailVerification => "email_verification",
            TokenPurpose::PasswordReset => "password_reset",
            TokenPurpose::Login2fa => "login_2fa",
            TokenPurpose::AccountChange => "account_change",
        }
    }
}

impl fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenPurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email_verification" => Ok(TokenPurpose::EmailVerification),
            "password_reset" => Ok(TokenPurpose::PasswordReset),
            "login_2fa" => Ok(TokenPurpose::Login2fa),
            "account_change" => Ok(TokenPurpose::AccountChange),
            other => Err(format!("Unknown token purpose: {}", other)),
        }
    }
}

/// A 6-digit code emailed to a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailVerificationToken {
    pub id: Uuid,
    pub user_id: Uuid,

    /// The 6-digit code, zero padded
    pub code: String,

    pub purpose: TokenPurpose,

    /// Number of verification attempts made
    pub attempts: i32,

    pub is_used: bool,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl EmailVerificationToken {
    /// Creates a token with a fresh random code and the default lifetime
    pub fn new(user_id: Uuid, purpose: TokenPurpose) -> Self {
        Self::new_with_expiration(user_id, purpose, Duration::hours(DEFAULT_EXPIRATION_HOURS))
    }

    pub fn new_with_expiration(user_id: Uuid, purpose: TokenPurpose, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            code: Self::generate_code(),
            purpose,
            attempts: 0,
            is_used: false,
            used_at: None,
            created_at: now,
            expires_at: now + lifetime,
        }
    }

    /// Generates a cryptographically secure random 6-digit code
    pub(crate) fn generate_code() -> String {
        let mut rng = rand::thread_rng();
        let code: u32 = rng.gen_range(0..1_000_000);
        format!("{:06}", code)
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Usable only while unused, unexpired and under the attempt ceiling
    pub fn is_valid(&self) -> bool {
        !self.is_used && !self.is_expired() && self.attempts < MAX_ATTEMPTS
    }

    pub fn remaining_attempts(&self) -> i32 {
        (MAX_ATTEMPTS - self.attempts).max(0)
    }

    /// Checks `input_code` against this token.
    ///
    /// Every call on a still-valid token counts as an attempt. A match marks
    /// the token used. Once the ceiling is hit the token is rejected even if
    /// the right code is supplied.
    pub fn verify(&mut self, input_code: &str) -> Result<(), AuthError> {
        if self.is_used {
            return Err(AuthError::VerificationCodeUsed);
        }
        if self.is_expired() {
            return Err(AuthError::VerificationCodeExpired);
        }
        if self.attempts >= MAX_ATTEMPTS {
            return Err(AuthError::MaxAttemptsExceeded);
        }

        self.attempts += 1;

        if constant_time_eq(self.code.as_bytes(), input_code.trim().as_bytes()) {
            self.mark_as_used();
            Ok(())
        } else {
            Err(AuthError::InvalidVerificationCode)
        }
    }

    pub fn mark_as_used(&mut self) {
        self.is_used = true;
        self.used_at = Some(Utc::now());
    }
}
