//! In-memory implementation of TokenRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainError;

use super::trait_::TokenRepository;

#[derive(Clone, Default)]
pub struct InMemoryTokenRepository {
    tokens: Arc<RwLock<HashMap<Uuid, RefreshToken>>>,
    blacklist: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored token, for assertions
    pub async fn all_tokens(&self) -> Vec<RefreshToken> {
        self.tokens.read().await.values().cloned().collect()
    }
}

fn revoke_where<F>(tokens: &mut HashMap<Uuid, RefreshToken>, predicate: F) -> u64
where
    F: Fn(&RefreshToken) -> bool,
{
    let mut count = 0;
    for token in tokens.values_mut() {
        if !token.is_revoked && predicate(token) {
            token.revoke();
            count += 1;
        }
    }
    count
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        let mut tokens = self.tokens.write().await;
        if tokens.values().any(|t| t.token_hash == token.token_hash) {
            return Err(DomainError::BusinessRule {
                message: "Duplicate refresh token".to_string(),
            });
        }
        tokens.insert(token.id, token.clone());
        Ok(token)
    }

    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.values().find(|t| t.token_hash == token_hash).cloned())
    }

    async fn revoke_token(&self, token_id: Uuid) -> Result<(), DomainError> {
        let mut tokens = self.tokens.write().await;
        match tokens.get_mut(&token_id) {
            Some(token) => {
                token.revoke();
                Ok(())
            }
            None => Err(DomainError::not_found("Refresh token")),
        }
    }

    async fn revoke_family(&self, token_family: Uuid) -> Result<u64, DomainError> {
        let mut tokens = self.tokens.write().await;
        Ok(revoke_where(&mut tokens, |t| t.token_family == token_family))
    }

    async fn revoke_all_user_tokens(&self, user_id: Uuid) -> Result<u64, DomainError> {
        let mut tokens = self.tokens.write().await;
        Ok(revoke_where(&mut tokens, |t| t.user_id == user_id))
    }

    async fn revoke_session_tokens(&self, session_id: Uuid) -> Result<u64, DomainError> {
        let mut tokens = self.tokens.write().await;
        Ok(revoke_where(&mut tokens, |t| t.session_id == session_id))
    }

    async fn blacklist_jti(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), DomainError> {
        self.blacklist.write().await.insert(jti.to_string(), expires_at);
        Ok(())
    }

    async fn is_jti_blacklisted(&self, jti: &str) -> Result<bool, DomainError> {
        Ok(self.blacklist.read().await.contains_key(jti))
    }

    async fn delete_expired(&self) -> Result<u64, DomainError> {
        let now = Utc::now();

        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| t.expires_at > now);
        let removed_tokens = before - tokens.len();

        let mut blacklist = self.blacklist.write().await;
        let before = blacklist.len();
        blacklist.retain(|_, expires_at| *expires_at > now);
        let removed_jtis = before - blacklist.len();

        Ok((removed_tokens + removed_jtis) as u64)
    }

    async fn count_active_tokens(&self, user_id: Uuid) -> Result<u64, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .values()
            .filter(|t| t.user_id == user_id && t.is_valid())
            .count() as u64)
    }
}
