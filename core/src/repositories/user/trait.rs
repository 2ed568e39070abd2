//! User repository trait defining the interface for user data persistence.
//!
//! Emails and usernames are stored lowercased, so lookups expect already
//! normalized input.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

/// Repository trait for User entity persistence operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// Insert a new user.
    ///
    /// # Errors
    /// * `AuthError::EmailAlreadyExists` / `AuthError::UsernameAlreadyExists`
    ///   when a unique field clashes
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Persist every field of an existing user
    async fn update(&self, user: User) -> Result<User, DomainError>;

    async fn email_exists(&self, email: &str) -> Result<bool, DomainError>;

    async fn username_exists(&self, username: &str) -> Result<bool, DomainError>;

    /// Total number of accounts, active or not
    async fn count(&self) -> Result<u64, DomainError>;
}
