//! Configuration module with business-specific sub-modules
//!
//! Everything is read from environment variables (optionally seeded from a
//! `.env` file):
//! - `auth` - JWT signing configuration
//! - `cache` - Redis configuration
//! - `database` - Postgres pool configuration
//! - `email` - outbound email backend
//! - `environment` - environment detection and logging configuration
//! - `maps` - map search limits and Mapbox token
//! - `payment` - payment gateway configuration
//! - `rate_limit` - throttling budgets
//! - `server` - HTTP server and CORS configuration

pub mod auth;
pub mod cache;
pub mod database;
pub mod email;
pub mod environment;
pub mod maps;
pub mod payment;
pub mod rate_limit;
pub mod server;

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use thiserror::Error;

pub use auth::JwtConfig;
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use email::{EmailBackend, EmailConfig};
pub use environment::{Environment, LoggingConfig};
pub use maps::MapsConfig;
pub use payment::PaymentConfig;
pub use rate_limit::{RateLimitConfig, RateLimitRule};
pub use server::{CorsConfig, ServerConfig};

/// Minimum secret length accepted in production
pub const MIN_SECRET_LENGTH: usize = 32;

/// Configuration problems detected at startup
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub cache: CacheConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub email: EmailConfig,
    pub payment: PaymentConfig,
    pub maps: MapsConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            jwt: JwtConfig::default(),
            cache: CacheConfig::default(),
            rate_limit: RateLimitConfig::default(),
            cors: CorsConfig::development(),
            email: EmailConfig::default(),
            payment: PaymentConfig::default(),
            maps: MapsConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the working directory is applied first; variables
    /// already present in the environment win.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let environment = Environment::from_env();

        let config = Self {
            environment,
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            jwt: JwtConfig::from_env(),
            cache: CacheConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
            cors: CorsConfig::from_env(!environment.is_production()),
            email: EmailConfig::from_env(),
            payment: PaymentConfig::from_env(),
            maps: MapsConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that are unsafe to run with in production
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.environment.is_production() {
            return Ok(());
        }

        if self.jwt.is_using_default_secret() {
            return Err(ConfigError::Missing("SECRET_KEY"));
        }
        if self.jwt.secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::Invalid {
                key: "SECRET_KEY",
                reason: format!("must be at least {} characters", MIN_SECRET_LENGTH),
            });
        }
        if self.database.url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        if self.payment.webhook_secret.is_empty() {
            return Err(ConfigError::Missing("MERCADOPAGO_WEBHOOK_SECRET"));
        }

        Ok(())
    }
}

/// Parse an environment variable, falling back to `default` when it is
/// missing or malformed
pub(crate) fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

/// Read a comma separated list, skipping blank entries
pub(crate) fn env_list(key: &str) -> Vec<String> {
    env::var(key)
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
