//! Rate limiting configuration module

use serde::{Deserialize, Serialize};

use super::env_parse;

/// A request budget: at most `max_requests` inside `window_seconds`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RateLimitRule {
    pub max_requests: u32,
    pub window_seconds: u64,
}

impl RateLimitRule {
    pub const fn new(max_requests: u32, window_seconds: u64) -> Self {
        Self {
            max_requests,
            window_seconds,
        }
    }

    fn from_env(prefix: &str, defaults: Self) -> Self {
        Self {
            max_requests: env_parse(&format!("{}_LIMIT", prefix), defaults.max_requests),
            window_seconds: env_parse(&format!("{}_WINDOW_SECONDS", prefix), defaults.window_seconds),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Master switch, mostly useful for load tests
    pub enabled: bool,

    /// Login attempts per client IP
    pub login_per_ip: RateLimitRule,

    /// Account registrations per client IP
    pub register_per_ip: RateLimitRule,

    /// Verification emails per user
    pub verification_email_per_user: RateLimitRule,

    /// Any API call per client IP
    pub api_per_ip: RateLimitRule,

    /// Email/username availability checks per client IP
    pub availability_per_ip: RateLimitRule,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            login_per_ip: RateLimitRule::new(5, 3600),
            register_per_ip: RateLimitRule::new(10, 3600),
            verification_email_per_user: RateLimitRule::new(5, 3600),
            api_per_ip: RateLimitRule::new(120, 60),
            availability_per_ip: RateLimitRule::new(30, 60),
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_parse("RATE_LIMIT_ENABLED", defaults.enabled),
            login_per_ip: RateLimitRule::from_env("RATE_LIMIT_LOGIN", defaults.login_per_ip),
            register_per_ip: RateLimitRule::from_env("RATE_LIMIT_REGISTER", defaults.register_per_ip),
            verification_email_per_user: RateLimitRule::from_env(
                "RATE_LIMIT_VERIFICATION_EMAIL",
                defaults.verification_email_per_user,
            ),
            api_per_ip: RateLimitRule::from_env("RATE_LIMIT_API", defaults.api_per_ip),
            availability_per_ip: RateLimitRule::from_env(
                "RATE_LIMIT_AVAILABILITY",
                defaults.availability_per_ip,
            ),
        }
    }

    /// Limits that never trigger, for tests that are not about throttling
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}
