use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user_profile::UserProfile;
use crate::errors::DomainError;

#[async_trait]
pub trait UserProfileRepository: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<UserProfile>, DomainError>;

    /// Insert or replace the profile of `profile.user_id`
    async fn save(&self, profile: UserProfile) -> Result<UserProfile, DomainError>;
}
