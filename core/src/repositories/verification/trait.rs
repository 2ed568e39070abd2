//! Persistence of emailed verification codes.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::verification_token::{EmailVerificationToken, TokenPurpose};
use crate::errors::DomainError;

#[async_trait]
pub trait VerificationTokenRepository: Send + Sync {
    async fn create(&self, token: EmailVerificationToken) -> Result<EmailVerificationToken, DomainError>;

    /// Most recently created unused token for the user and purpose
    async fn find_latest_unused(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
    ) -> Result<Option<EmailVerificationToken>, DomainError>;

    /// Most recently created token for the user and purpose, used or not
    async fn find_latest(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
    ) -> Result<Option<EmailVerificationToken>, DomainError>;

    /// Persist attempts / used state
    async fn update(&self, token: EmailVerificationToken) -> Result<EmailVerificationToken, DomainError>;

    /// Delete every unused token of this purpose; returns how many went away
    async fn delete_unused(&self, user_id: Uuid, purpose: TokenPurpose) -> Result<u64, DomainError>;

    /// Delete tokens past their expiry
    async fn delete_expired(&self) -> Result<u64, DomainError>;
}
