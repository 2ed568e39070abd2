//! Server configuration module

use serde::{Deserialize, Serialize};
use std::env;

use super::{env_list, env_parse};

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Worker threads (0 = number of CPU cores)
    pub workers: usize,

    /// Keep-alive timeout in seconds
    pub keep_alive: u64,

    /// Maximum JSON payload size in bytes
    pub max_payload_size: usize,

    /// Proxies whose `X-Forwarded-*` headers are trusted
    pub trusted_proxies: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8000,
            workers: 0,
            keep_alive: 75,
            max_payload_size: 2 * 1024 * 1024,
            trusted_proxies: vec![],
        }
    }
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env_parse("PORT", defaults.port),
            workers: env_parse("WORKERS", defaults.workers),
            keep_alive: env_parse("KEEP_ALIVE", defaults.keep_alive),
            max_payload_size: env_parse("MAX_PAYLOAD_SIZE", defaults.max_payload_size),
            trusted_proxies: env_list("TRUSTED_PROXIES"),
        }
    }

    /// `host:port` string for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    /// Allow any origin (development only)
    pub allow_any_origin: bool,

    /// Explicitly allowed origins
    pub allowed_origins: Vec<String>,

    /// Max age for preflight cache in seconds
    pub max_age: usize,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_any_origin: false,
            allowed_origins: vec![],
            max_age: 3600,
        }
    }
}

impl CorsConfig {
    /// Permissive CORS for local development
    pub fn development() -> Self {
        Self {
            allow_any_origin: true,
            ..Default::default()
        }
    }

    pub fn from_env(allow_any_origin: bool) -> Self {
        Self {
            allow_any_origin: env_parse("CORS_ALLOW_ALL_ORIGINS", allow_any_origin),
            allowed_origins: env_list("CORS_ALLOWED_ORIGINS"),
            max_age: env_parse("CORS_MAX_AGE", 3600),
        }
    }
}
