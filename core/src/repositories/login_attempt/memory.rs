use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::login_attempt::LoginAttempt;
use crate::errors::DomainError;

use super::trait_::LoginAttemptRepository;

#[derive(Clone, Default)]
pub struct InMemoryLoginAttemptRepository {
    attempts: Arc<RwLock<Vec<LoginAttempt>>>,
}

impl InMemoryLoginAttemptRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LoginAttemptRepository for InMemoryLoginAttemptRepository {
    async fn create(&self, attempt: LoginAttempt) -> Result<LoginAttempt, DomainError> {
        self.attempts.write().await.push(attempt.clone());
        Ok(attempt)
    }

    async fn recent_for_email(&self, email: &str, limit: usize) -> Result<Vec<LoginAttempt>, DomainError> {
        let attempts = self.attempts.read().await;
        let mut matching: Vec<LoginAttempt> =
            attempts.iter().filter(|a| a.email == email).cloned().collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matching.truncate(limit);
        Ok(matching)
    }

    async fn count_for_email(
        &self,
        email: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<u64, DomainError> {
        let attempts = self.attempts.read().await;
        Ok(attempts
            .iter()
            .filter(|a| a.email == email)
            .filter(|a| since.map_or(true, |since| a.timestamp >= since))
            .count() as u64)
    }

    async fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut attempts = self.attempts.write().await;
        let before = attempts.len();
        attempts.retain(|a| a.timestamp >= cutoff);
        Ok((before - attempts.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::login_attempt::LoginFailureReason;
    use chrono::Duration;

    #[tokio::test]
    async fn test_recent_is_newest_first_and_limited() {
        let repo = InMemoryLoginAttemptRepository::new();
        for offset in [3, 1, 2] {
            let mut attempt = LoginAttempt::failure("a@x.com", LoginFailureReason::InvalidCredentials);
            attempt.timestamp = Utc::now() - Duration::minutes(offset);
            repo.create(attempt).await.unwrap();
        }
        repo.create(LoginAttempt::success("b@x.com")).await.unwrap();

        let recent = repo.recent_for_email("a@x.com", 2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert!(recent[0].timestamp > recent[1].timestamp);
    }

    #[tokio::test]
    async fn test_count_since() {
        let repo = InMemoryLoginAttemptRepository::new();
        let mut old = LoginAttempt::success("a@x.com");
        old.timestamp = Utc::now() - Duration::days(2);
        repo.create(old).await.unwrap();
        repo.create(LoginAttempt::success("a@x.com")).await.unwrap();

        assert_eq!(repo.count_for_email("a@x.com", None).await.unwrap(), 2);
        let since = Utc::now() - Duration::days(1);
        assert_eq!(repo.count_for_email("a@x.com", Some(since)).await.unwrap(), 1);
        assert_eq!(repo.delete_before(since).await.unwrap(), 1);
    }
}
