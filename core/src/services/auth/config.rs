//! Configuration for the authentication service

use sb_shared::RateLimitConfig;

/// How many login attempts the security log shows
pub const SECURITY_LOG_LIMIT: usize = 50;

/// How many alternatives are offered for a taken username
pub const USERNAME_SUGGESTIONS: usize = 5;

/// Configuration for the authentication service
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// Rate limit configuration
    pub rate_limit: RateLimitConfig,
    pub security_log_limit: usize,
    pub username_suggestions: usize,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self {
            rate_limit: RateLimitConfig::default(),
            security_log_limit: SECURITY_LOG_LIMIT,
            username_suggestions: USERNAME_SUGGESTIONS,
        }
    }
}

impl AuthServiceConfig {
    pub fn with_rate_limit(rate_limit: RateLimitConfig) -> Self {
        Self {
            rate_limit,
            ..Self::default()
        }
    }
}
