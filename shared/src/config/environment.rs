//! Environment configuration module

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

/// Application environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Test runs (CI, integration tests)
    Test,
    /// Staging deployment
    Staging,
    /// Production deployment
    Production,
}

impl Environment {
    /// Check if running in production
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    /// Read the environment from `ENVIRONMENT`, falling back to `RUST_ENV`.
    ///
    /// Unknown values resolve to development.
    pub fn from_env() -> Self {
        env::var("ENVIRONMENT")
            .or_else(|_| env::var("RUST_ENV"))
            .unwrap_or_else(|_| String::from("development"))
            .parse()
            .unwrap_or_default()
    }

    /// Default tracing filter for this environment
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            Environment::Development | Environment::Test => "debug,sqlx=warn",
            Environment::Staging => "info",
            Environment::Production => "info,sqlx=warn",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Staging => "staging",
            Environment::Production => "production",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Environment::Development),
            "test" | "testing" => Ok(Environment::Test),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("Unknown environment: {}", other)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Filter directive, same syntax as `RUST_LOG`
    pub filter: String,
    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

impl LoggingConfig {
    pub fn for_environment(env: Environment) -> Self {
        Self {
            filter: env.default_log_filter().to_string(),
            json: env.is_production(),
        }
    }

    pub fn from_env(env: Environment) -> Self {
        let defaults = Self::for_environment(env);
        Self {
            filter: env::var("RUST_LOG").unwrap_or(defaults.filter),
            json: super::env_parse("LOG_JSON", defaults.json),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}
