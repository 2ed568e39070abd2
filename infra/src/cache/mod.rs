//! Redis connectivity and the Redis-backed rate limiter.

pub mod rate_limiter;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::info;

use sb_core::services::HealthProbe;
use sb_shared::config::cache::CacheConfig;

use crate::InfrastructureError;

pub use rate_limiter::RedisRateLimiter;

/// Open a managed Redis connection that reconnects on failure
pub async fn connect_redis(config: &CacheConfig) -> Result<ConnectionManager, InfrastructureError> {
    let url = config
        .redis_url
        .as_deref()
        .ok_or_else(|| InfrastructureError::Config("REDIS_URL is not set".to_string()))?;

    let client = redis::Client::open(url)?;
    let manager = ConnectionManager::new(client).await?;

    info!(url = %mask_url(url), "Connected to Redis");
    Ok(manager)
}

/// Hide credentials in a Redis URL before logging it
pub fn mask_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}****{}", &url[..scheme_end + 3], &url[at..])
        }
        _ => url.to_string(),
    }
}

/// Health probe issuing a PING
#[derive(Clone)]
pub struct RedisHealthProbe {
    conn: ConnectionManager,
}

impl RedisHealthProbe {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl HealthProbe for RedisHealthProbe {
    fn name(&self) -> &'static str {
        "cache"
    }

    async fn check(&self) -> Result<(), String> {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map(|_| ())
            .map_err(|_| "cache unavailable".to_string())
    }
}
