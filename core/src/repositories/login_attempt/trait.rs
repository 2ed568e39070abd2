use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::login_attempt::LoginAttempt;
use crate::errors::DomainError;

/// Append-only store of login attempts
#[async_trait]
pub trait LoginAttemptRepository: Send + Sync {
    async fn create(&self, attempt: LoginAttempt) -> Result<LoginAttempt, DomainError>;

    /// Most recent attempts for `email`, newest first
    async fn recent_for_email(&self, email: &str, limit: usize) -> Result<Vec<LoginAttempt>, DomainError>;

    /// Attempts for `email`, optionally only those at or after `since`
    async fn count_for_email(
        &self,
        email: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<u64, DomainError>;

    /// Drop attempts older than `cutoff`
    async fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError>;
}
