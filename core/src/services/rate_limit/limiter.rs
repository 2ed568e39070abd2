//! Rate limiting trait shared by the in-memory and Redis backends

use async_trait::async_trait;
use sb_shared::RateLimitRule;

/// Outcome of a single rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    /// Whether this request fits in the current window
    pub allowed: bool,
    /// Requests left in the current window
    pub remaining: u32,
    /// Seconds until the window resets
    pub retry_after_seconds: u64,
}

/// Rate limiting service trait
#[async_trait]
pub trait RateLimiterTrait: Send + Sync {
    /// Count one request against `key` and report whether it is allowed.
    ///
    /// The counter is incremented even when the limit is already reached.
    async fn check_and_increment(
        &self,
        key: &str,
        limit: u32,
        window_seconds: u64,
    ) -> Result<RateLimitStatus, String>;

    /// Forget the counter for `key`
    async fn reset(&self, key: &str) -> Result<(), String>;

    /// Convenience wrapper taking a configured rule
    async fn check_rule(&self, key: &str, rule: RateLimitRule) -> Result<RateLimitStatus, String> {
        self.check_and_increment(key, rule.max_requests, rule.window_seconds)
            .await
    }
}

/// Builds a namespaced limiter key
pub fn rate_limit_key(action: &str, identifier: &str) -> String {
    format!("{}:{}", action, identifier)
}
