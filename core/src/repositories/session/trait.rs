use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::session::UserSession;
use crate::errors::DomainError;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: UserSession) -> Result<UserSession, DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserSession>, DomainError>;

    /// Active sessions of a user, most recently used first
    async fn list_active(&self, user_id: Uuid) -> Result<Vec<UserSession>, DomainError>;

    async fn update(&self, session: UserSession) -> Result<UserSession, DomainError>;

    /// Deactivate every session of a user
    async fn deactivate_all(&self, user_id: Uuid) -> Result<u64, DomainError>;

    /// Deactivate sessions idle since before `cutoff`
    async fn deactivate_stale(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError>;
}
