//! In-memory implementation of VerificationTokenRepository

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::verification_token::{EmailVerificationToken, TokenPurpose};
use crate::errors::DomainError;

use super::trait_::VerificationTokenRepository;

#[derive(Clone, Default)]
pub struct InMemoryVerificationTokenRepository {
    tokens: Arc<RwLock<HashMap<Uuid, EmailVerificationToken>>>,
}

impl InMemoryVerificationTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tokens, for assertions
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

#[async_trait]
impl VerificationTokenRepository for InMemoryVerificationTokenRepository {
    async fn create(&self, token: EmailVerificationToken) -> Result<EmailVerificationToken, DomainError> {
        self.tokens.write().await.insert(token.id, token.clone());
        Ok(token)
    }

    async fn find_latest_unused(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
    ) -> Result<Option<EmailVerificationToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .values()
            .filter(|t| t.user_id == user_id && t.purpose == purpose && !t.is_used)
            .max_by_key(|t| t.created_at)
            .cloned())
    }

    async fn find_latest(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
    ) -> Result<Option<EmailVerificationToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .values()
            .filter(|t| t.user_id == user_id && t.purpose == purpose)
            .max_by_key(|t| t.created_at)
            .cloned())
    }

    async fn update(&self, token: EmailVerificationToken) -> Result<EmailVerificationToken, DomainError> {
        let mut tokens = self.tokens.write().await;
        if !tokens.contains_key(&token.id) {
            return Err(DomainError::not_found("Verification token"));
        }
        tokens.insert(token.id, token.clone());
        Ok(token)
    }

    async fn delete_unused(&self, user_id: Uuid, purpose: TokenPurpose) -> Result<u64, DomainError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| !(t.user_id == user_id && t.purpose == purpose && !t.is_used));
        Ok((before - tokens.len()) as u64)
    }

    async fn delete_expired(&self) -> Result<u64, DomainError> {
        let now = Utc::now();
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| t.expires_at > now);
        Ok((before - tokens.len()) as u64)
    }
}
