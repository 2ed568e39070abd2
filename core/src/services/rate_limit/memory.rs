//! Process-local rate limiter

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::limiter::{RateLimitStatus, RateLimiterTrait};

/// Map size that triggers the first sweep of expired windows
const DEFAULT_PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    length: Duration,
    count: u32,
}

impl Window {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.started) >= self.length
    }
}

struct Windows {
    by_key: HashMap<String, Window>,
    /// Sweep when the map grows past this size
    prune_at: usize,
    min_prune_at: usize,
}

impl Windows {
    fn prune(&mut self, now: Instant) -> usize {
        let before = self.by_key.len();
        self.by_key.retain(|_, window| !window.is_expired(now));
        // live keys alone can exceed the threshold; back off so sweeps stay amortized
        self.prune_at = (self.by_key.len() * 2).max(self.min_prune_at);
        before - self.by_key.len()
    }
}

/// Fixed-window counters kept in memory.
///
/// Only suitable for a single instance; multi-instance deployments use the
/// Redis limiter. Expired windows are swept once the map passes a size
/// threshold, so one-off clients do not accumulate.
#[derive(Clone)]
pub struct InMemoryRateLimiter {
    windows: Arc<Mutex<Windows>>,
}

impl Default for InMemoryRateLimiter {
    fn default() -> Self {
        Self::with_prune_threshold(DEFAULT_PRUNE_THRESHOLD)
    }
}

impl InMemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prune_threshold(threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            windows: Arc::new(Mutex::new(Windows {
                by_key: HashMap::new(),
                prune_at: threshold,
                min_prune_at: threshold,
            })),
        }
    }

    /// Drop every expired window, returning how many were removed
    pub async fn prune_expired(&self) -> usize {
        self.windows.lock().await.prune(Instant::now())
    }

    /// Number of keys currently tracked
    pub async fn tracked_keys(&self) -> usize {
        self.windows.lock().await.by_key.len()
    }
}

#[async_trait]
impl RateLimiterTrait for InMemoryRateLimiter {
    async fn check_and_increment(
        &self,
        key: &str,
        limit: u32,
        window_seconds: u64,
    ) -> Result<RateLimitStatus, String> {
        let window_length = Duration::from_secs(window_seconds);
        let now = Instant::now();
        let mut windows = self.windows.lock().await;

        if windows.by_key.len() >= windows.prune_at {
            let removed = windows.prune(now);
            tracing::debug!(removed, tracked = windows.by_key.len(), "Pruned expired rate limit windows");
        }

        let fresh = Window {
            started: now,
            length: window_length,
            count: 0,
        };
        let window = windows.by_key.entry(key.to_string()).or_insert(fresh);
        if window.is_expired(now) {
            *window = fresh;
        }
        window.count = window.count.saturating_add(1);

        let elapsed = now.duration_since(window.started);
        let retry_after = window_length.saturating_sub(elapsed).as_secs().max(1);

        Ok(RateLimitStatus {
            allowed: window.count <= limit,
            remaining: limit.saturating_sub(window.count),
            retry_after_seconds: retry_after,
        })
    }

    async fn reset(&self, key: &str) -> Result<(), String> {
        self.windows.lock().await.by_key.remove(key);
        Ok(())
    }
}
