//! JWT authentication configuration

use serde::{Deserialize, Serialize};
use std::env;

use super::env_parse;

const DEV_SECRET: &str = "sombreando-dev-secret-change-in-production";

/// JWT authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Secret used to sign HS256 tokens (`SECRET_KEY`)
    pub secret: String,

    /// Access token lifetime in minutes
    pub access_token_minutes: i64,

    /// Refresh token lifetime in days
    pub refresh_token_days: i64,

    /// `iss` claim
    pub issuer: String,

    /// `aud` claim
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEV_SECRET),
            access_token_minutes: 60,
            refresh_token_days: 7,
            issuer: String::from("sombreando"),
            audience: String::from("sombreando-app"),
        }
    }
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            secret: env::var("SECRET_KEY")
                .or_else(|_| env::var("JWT_SECRET"))
                .unwrap_or(defaults.secret),
            access_token_minutes: env_parse("JWT_ACCESS_TOKEN_MINUTES", defaults.access_token_minutes),
            refresh_token_days: env_parse("JWT_REFRESH_TOKEN_DAYS", defaults.refresh_token_days),
            issuer: env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            audience: env::var("JWT_AUDIENCE").unwrap_or(defaults.audience),
        }
    }

    /// True while the development fallback secret is in use
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEV_SECRET
    }
}
