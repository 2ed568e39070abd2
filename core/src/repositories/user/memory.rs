//! In-memory implementation of UserRepository

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::{AuthError, DomainError};

use super::trait_::UserRepository;

/// User store backed by a `HashMap`, for tests and database-less runs
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(AuthError::EmailAlreadyExists.into());
        }
        if users.values().any(|u| u.username == user.username) {
            return Err(AuthError::UsernameAlreadyExists.into());
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Err(DomainError::not_found("User"));
        }
        if users
            .values()
            .any(|u| u.id != user.id && (u.email == user.email || u.username == user.username))
        {
            return Err(DomainError::BusinessRule {
                message: "email or username already in use".to_string(),
            });
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
        Ok(self.users.read().await.values().any(|u| u.email == email))
    }

    async fn username_exists(&self, username: &str) -> Result<bool, DomainError> {
        Ok(self.users.read().await.values().any(|u| u.username == username))
    }

    async fn count(&self) -> Result<u64, DomainError> {
        Ok(self.users.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str, username: &str) -> User {
        User::new(
            email.to_string(),
            username.to_string(),
            "hash".to_string(),
            "Ana".to_string(),
            "Souza".to_string(),
        )
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(user("ana@x.com", "ana")).await.unwrap();

        assert_eq!(repo.find_by_id(created.id).await.unwrap(), Some(created.clone()));
        assert_eq!(repo.find_by_email("ana@x.com").await.unwrap(), Some(created.clone()));
        assert_eq!(repo.find_by_username("ana").await.unwrap(), Some(created));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicates_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.create(user("ana@x.com", "ana")).await.unwrap();

        let err = repo.create(user("ana@x.com", "other")).await.unwrap_err();
        assert_eq!(err, DomainError::Auth(AuthError::EmailAlreadyExists));

        let err = repo.create(user("other@x.com", "ana")).await.unwrap_err();
        assert_eq!(err, DomainError::Auth(AuthError::UsernameAlreadyExists));
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let repo = InMemoryUserRepository::new();
        let err = repo.update(user("a@x.com", "a")).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
