//! Redis-based fixed-window rate limiter

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use sb_core::services::{RateLimitStatus, RateLimiterTrait};

/// Fixed-window counters shared by every API instance.
///
/// Each key holds an integer that expires with its window.
#[derive(Clone)]
pub struct RedisRateLimiter {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisRateLimiter {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        Self {
            conn,
            prefix: prefix.into(),
        }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}:ratelimit:{}", self.prefix, key)
    }
}

pub(crate) fn status_for(count: u64, limit: u32, ttl: i64, window_seconds: u64) -> RateLimitStatus {
    let retry_after_seconds = if ttl > 0 { ttl as u64 } else { window_seconds };
    RateLimitStatus {
        allowed: count <= limit as u64,
        remaining: (limit as u64).saturating_sub(count) as u32,
        retry_after_seconds,
    }
}

#[async_trait]
impl RateLimiterTrait for RedisRateLimiter {
    async fn check_and_increment(
        &self,
        key: &str,
        limit: u32,
        window_seconds: u64,
    ) -> Result<RateLimitStatus, String> {
        let key = self.full_key(key);
        let mut conn = self.conn.clone();

        let count: u64 = conn
            .incr(&key, 1u64)
            .await
            .map_err(|e| format!("Failed to increment rate limit counter: {}", e))?;

        if count == 1 {
            let _: () = conn
                .expire(&key, window_seconds as i64)
                .await
                .map_err(|e| format!("Failed to set rate limit expiry: {}", e))?;
        }

        let ttl: i64 = conn
            .ttl(&key)
            .await
            .map_err(|e| format!("Failed to read rate limit ttl: {}", e))?;

        // A counter left without expiry (crash between INCR and EXPIRE) would block forever
        if ttl == -1 {
            let _: () = conn
                .expire(&key, window_seconds as i64)
                .await
                .map_err(|e| format!("Failed to set rate limit expiry: {}", e))?;
        }

        Ok(status_for(count, limit, ttl, window_seconds))
    }

    async fn reset(&self, key: &str) -> Result<(), String> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .del(self.full_key(key))
            .await
            .map_err(|e| format!("Failed to reset rate limit: {}", e))?;
        Ok(())
    }
}
