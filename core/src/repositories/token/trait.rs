//! Refresh token and access-token blacklist persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainError;

/// Repository trait for RefreshToken entity persistence operations
///
/// # Security Considerations
/// - Tokens are hashed before storage
/// - Expired tokens should be periodically cleaned up
/// - Revoked tokens are kept until expiry so reuse can be detected
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Save a new refresh token
    ///
    /// # Errors
    /// * `DomainError::BusinessRule` - a token with the same hash already exists
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError>;

    /// Find a refresh token by its hashed value, revoked or not
    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError>;

    /// Mark a single token revoked
    async fn revoke_token(&self, token_id: Uuid) -> Result<(), DomainError>;

    /// Revoke every token of a rotation family; returns how many changed
    async fn revoke_family(&self, token_family: Uuid) -> Result<u64, DomainError>;

    /// Revoke every token of a user; returns how many changed
    async fn revoke_all_user_tokens(&self, user_id: Uuid) -> Result<u64, DomainError>;

    /// Revoke the tokens issued for one session
    async fn revoke_session_tokens(&self, session_id: Uuid) -> Result<u64, DomainError>;

    /// Remember an access token id until it would have expired anyway
    async fn blacklist_jti(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), DomainError>;

    async fn is_jti_blacklisted(&self, jti: &str) -> Result<bool, DomainError>;

    /// Delete expired refresh tokens and blacklist entries
    async fn delete_expired(&self) -> Result<u64, DomainError>;

    /// Count tokens that are neither revoked nor expired
    async fn count_active_tokens(&self, user_id: Uuid) -> Result<u64, DomainError>;
}
