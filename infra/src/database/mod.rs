//! Database module - PostgreSQL implementations using SQLx
//!
//! This module provides:
//! - Connection pool management and migrations
//! - One repository per core repository trait

pub mod connection;
pub mod postgres;

// Re-export commonly used types
pub use connection::{create_pool, run_migrations, PostgresHealthProbe};
pub use postgres::{
    PostgresLoginAttemptRepository, PostgresMapMarkerRepository, PostgresPaymentRepository,
    PostgresSessionRepository, PostgresTokenRepository, PostgresUserProfileRepository,
    PostgresUserRepository, PostgresVerificationTokenRepository,
};

use sb_core::errors::DomainError;

/// Wrap a query failure with what was being attempted
pub(crate) fn db_error(context: &str) -> impl FnOnce(sqlx::Error) -> DomainError + '_ {
    move |e| DomainError::Internal {
        message: format!("{}: {}", context, e),
    }
}

/// True for a unique constraint violation
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}
