//! # Infrastructure Layer
//!
//! Concrete implementations of the core traits:
//! - **Database**: PostgreSQL repositories using SQLx, plus migrations
//! - **Cache**: Redis backed rate limiting
//! - **Email**: console, mock and HTTP API delivery

// Re-export core types for convenience
pub use sb_core::errors::*;

/// Database module - PostgreSQL implementations using SQLx
pub mod database;

/// Cache module - Redis connection and rate limiting
pub mod cache;

/// Email delivery backends
pub mod email;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Redis error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Email delivery error
    #[error("Email service error: {0}")]
    Email(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(error: InfrastructureError) -> Self {
        DomainError::Internal {
            message: error.to_string(),
        }
    }
}
