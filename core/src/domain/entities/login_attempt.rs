//! Login attempt records kept for the security log and statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a login did not succeed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginFailureReason {
    InvalidCredentials,
    EmailNotVerified,
    AccountInactive,
    InvalidTwoFactorCode,
    RateLimited,
}

impl LoginFailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::EmailNotVerified => "email_not_verified",
            Self::AccountInactive => "account_inactive",
            Self::InvalidTwoFactorCode => "invalid_two_factor_code",
            Self::RateLimited => "rate_limited",
        }
    }
}

/// One login attempt, successful or not
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginAttempt {
    pub id: Uuid,
    /// Email as typed by the client, lowercased
    pub email: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub success: bool,
    pub failure_reason: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub country: Option<String>,
    pub city: Option<String>,
}

impl LoginAttempt {
    pub fn success(email: impl Into<String>) -> Self {
        Self::new(email.into(), true, None)
    }

    pub fn failure(email: impl Into<String>, reason: LoginFailureReason) -> Self {
        Self::new(email.into(), false, Some(reason.as_str().to_string()))
    }

    fn new(email: String, success: bool, failure_reason: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            ip_address: None,
            user_agent: None,
            success,
            failure_reason,
            timestamp: Utc::now(),
            country: None,
            city: None,
        }
    }

    /// Attach client IP and user agent
    pub fn with_request_context(
        mut self,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }

    /// Attach geolocation, when a proxy supplied it
    pub fn with_location(mut self, country: Option<String>, city: Option<String>) -> Self {
        self.country = country;
        self.city = city;
        self
    }
}
