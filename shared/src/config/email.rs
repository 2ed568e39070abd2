//! Outbound email configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use super::env_parse;

/// Which email backend delivers messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailBackend {
    /// Writes messages to the log
    Console,
    /// Posts messages to a transactional email HTTP API
    Http,
}

impl FromStr for EmailBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "console" => Ok(EmailBackend::Console),
            "http" | "api" => Ok(EmailBackend::Http),
            other => Err(format!("Unknown email backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmailConfig {
    pub backend: EmailBackend,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub from_address: String,
    pub from_name: String,
    pub max_retries: u32,
    pub timeout_seconds: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            backend: EmailBackend::Console,
            api_url: None,
            api_key: None,
            from_address: String::from("noreply@sombreando.com"),
            from_name: String::from("Sombreando"),
            max_retries: 3,
            timeout_seconds: 10,
        }
    }
}

impl EmailConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend: env_parse("EMAIL_BACKEND", defaults.backend),
            api_url: env::var("EMAIL_API_URL").ok(),
            api_key: env::var("EMAIL_API_KEY").ok(),
            from_address: env::var("DEFAULT_FROM_EMAIL").unwrap_or(defaults.from_address),
            from_name: env::var("EMAIL_FROM_NAME").unwrap_or(defaults.from_name),
            max_retries: env_parse("EMAIL_MAX_RETRIES", defaults.max_retries),
            timeout_seconds: env_parse("EMAIL_TIMEOUT_SECONDS", defaults.timeout_seconds),
        }
    }
}
