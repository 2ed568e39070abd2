//! Redis cache configuration

use serde::{Deserialize, Serialize};
use std::env;

/// Redis settings; without a URL the service keeps counters in process
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    pub redis_url: Option<String>,
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            key_prefix: String::from("sombreando"),
        }
    }
}

impl CacheConfig {
    pub fn from_env() -> Self {
        Self {
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.trim().is_empty()),
            key_prefix: env::var("REDIS_KEY_PREFIX").unwrap_or_else(|_| String::from("sombreando")),
        }
    }
}
