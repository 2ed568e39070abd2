use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::session::UserSession;
use crate::errors::DomainError;

use super::trait_::SessionRepository;

#[derive(Clone, Default)]
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<Uuid, UserSession>>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, session: UserSession) -> Result<UserSession, DomainError> {
        self.sessions.write().await.insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserSession>, DomainError> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn list_active(&self, user_id: Uuid) -> Result<Vec<UserSession>, DomainError> {
        let sessions = self.sessions.read().await;
        let mut active: Vec<UserSession> = sessions
            .values()
            .filter(|s| s.user_id == user_id && s.is_active)
            .cloned()
            .collect();
        active.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
        Ok(active)
    }

    async fn update(&self, session: UserSession) -> Result<UserSession, DomainError> {
        let mut sessions = self.sessions.write().await;
        if !sessions.contains_key(&session.id) {
            return Err(DomainError::not_found("Session"));
        }
        sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn deactivate_all(&self, user_id: Uuid) -> Result<u64, DomainError> {
        let mut sessions = self.sessions.write().await;
        let mut count = 0;
        for session in sessions.values_mut().filter(|s| s.user_id == user_id && s.is_active) {
            session.deactivate();
            count += 1;
        }
        Ok(count)
    }

    async fn deactivate_stale(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut sessions = self.sessions.write().await;
        let mut count = 0;
        for session in sessions
            .values_mut()
            .filter(|s| s.is_active && s.last_activity < cutoff)
        {
            session.deactivate();
            count += 1;
        }
        Ok(count)
    }
}
