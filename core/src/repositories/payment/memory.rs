use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::payment::{PaymentIntent, PaymentMethod, Subscription};
use crate::errors::DomainError;

use super::trait_::PaymentRepository;

#[derive(Clone, Default)]
pub struct InMemoryPaymentRepository {
    methods: Arc<RwLock<HashMap<Uuid, PaymentMethod>>>,
    subscriptions: Arc<RwLock<HashMap<Uuid, Subscription>>>,
    intents: Arc<RwLock<HashMap<Uuid, PaymentIntent>>>,
    webhook_events: Arc<RwLock<HashSet<String>>>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn create_method(&self, method: PaymentMethod) -> Result<PaymentMethod, DomainError> {
        self.methods.write().await.insert(method.id, method.clone());
        Ok(method)
    }

    async fn list_methods(&self, user_id: Uuid) -> Result<Vec<PaymentMethod>, DomainError> {
        let methods = self.methods.read().await;
        let mut owned: Vec<PaymentMethod> =
            methods.values().filter(|m| m.user_id == user_id).cloned().collect();
        owned.sort_by(|a, b| {
            b.is_default
                .cmp(&a.is_default)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(owned)
    }

    async fn find_method(&self, id: Uuid) -> Result<Option<PaymentMethod>, DomainError> {
        Ok(self.methods.read().await.get(&id).cloned())
    }

    async fn delete_method(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.methods.write().await.remove(&id).is_some())
    }

    async fn set_default_method(&self, user_id: Uuid, method_id: Uuid) -> Result<(), DomainError> {
        let mut methods = self.methods.write().await;
        if !methods
            .get(&method_id)
            .map_or(false, |m| m.user_id == user_id)
        {
            return Err(DomainError::not_found("Payment method"));
        }
        for method in methods.values_mut().filter(|m| m.user_id == user_id) {
            method.is_default = method.id == method_id;
        }
        Ok(())
    }

    async fn create_subscription(&self, subscription: Subscription) -> Result<Subscription, DomainError> {
        self.subscriptions
            .write()
            .await
            .insert(subscription.id, subscription.clone());
        Ok(subscription)
    }

    async fn update_subscription(&self, subscription: Subscription) -> Result<Subscription, DomainError> {
        let mut subscriptions = self.subscriptions.write().await;
        if !subscriptions.contains_key(&subscription.id) {
            return Err(DomainError::not_found("Subscription"));
        }
        subscriptions.insert(subscription.id, subscription.clone());
        Ok(subscription)
    }

    async fn find_subscription(&self, id: Uuid) -> Result<Option<Subscription>, DomainError> {
        Ok(self.subscriptions.read().await.get(&id).cloned())
    }

    async fn find_current_subscription(&self, user_id: Uuid) -> Result<Option<Subscription>, DomainError> {
        let subscriptions = self.subscriptions.read().await;
        Ok(subscriptions
            .values()
            .filter(|s| s.user_id == user_id && s.is_current())
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn create_intent(&self, intent: PaymentIntent) -> Result<PaymentIntent, DomainError> {
        self.intents.write().await.insert(intent.id, intent.clone());
        Ok(intent)
    }

    async fn update_intent(&self, intent: PaymentIntent) -> Result<PaymentIntent, DomainError> {
        let mut intents = self.intents.write().await;
        if !intents.contains_key(&intent.id) {
            return Err(DomainError::not_found("Payment intent"));
        }
        intents.insert(intent.id, intent.clone());
        Ok(intent)
    }

    async fn find_intent(&self, id: Uuid) -> Result<Option<PaymentIntent>, DomainError> {
        Ok(self.intents.read().await.get(&id).cloned())
    }

    async fn find_intent_by_provider_id(
        &self,
        provider_payment_id: &str,
    ) -> Result<Option<PaymentIntent>, DomainError> {
        let intents = self.intents.read().await;
        Ok(intents
            .values()
            .find(|i| i.provider_payment_id.as_deref() == Some(provider_payment_id))
            .cloned())
    }

    async fn list_intents(&self, user_id: Uuid) -> Result<Vec<PaymentIntent>, DomainError> {
        let intents = self.intents.read().await;
        let mut owned: Vec<PaymentIntent> =
            intents.values().filter(|i| i.user_id == user_id).cloned().collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn record_webhook_event(&self, event_id: &str) -> Result<bool, DomainError> {
        Ok(self.webhook_events.write().await.insert(event_id.to_string()))
    }

    async fn forget_webhook_event(&self, event_id: &str) -> Result<(), DomainError> {
        self.webhook_events.write().await.remove(event_id);
        Ok(())
    }
}
