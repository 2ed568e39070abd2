use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::user_profile::UserProfile;
use crate::errors::DomainError;

use super::trait_::UserProfileRepository;

#[derive(Clone, Default)]
pub struct InMemoryUserProfileRepository {
    profiles: Arc<RwLock<HashMap<Uuid, UserProfile>>>,
}

impl InMemoryUserProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserProfileRepository for InMemoryUserProfileRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<UserProfile>, DomainError> {
        Ok(self.profiles.read().await.get(&user_id).cloned())
    }

    async fn save(&self, profile: UserProfile) -> Result<UserProfile, DomainError> {
        self.profiles
            .write()
            .await
            .insert(profile.user_id, profile.clone());
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_replaces_existing() {
        let repo = InMemoryUserProfileRepository::new();
        let user_id = Uuid::new_v4();
        assert!(repo.find_by_user(user_id).await.unwrap().is_none());

        let mut profile = repo.save(UserProfile::new(user_id)).await.unwrap();
        profile.location = "Recife".to_string();
        repo.save(profile).await.unwrap();

        let stored = repo.find_by_user(user_id).await.unwrap().unwrap();
        assert_eq!(stored.location, "Recife");
    }
}
