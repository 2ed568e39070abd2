//! Persistence for payment methods, subscriptions, payment intents and
//! processed webhook notifications.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::payment::{PaymentIntent, PaymentMethod, Subscription};
use crate::errors::DomainError;

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    // Payment methods

    async fn create_method(&self, method: PaymentMethod) -> Result<PaymentMethod, DomainError>;

    /// Methods of a user, default first then newest
    async fn list_methods(&self, user_id: Uuid) -> Result<Vec<PaymentMethod>, DomainError>;

    async fn find_method(&self, id: Uuid) -> Result<Option<PaymentMethod>, DomainError>;

    async fn delete_method(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Make `method_id` the only default method of `user_id`
    async fn set_default_method(&self, user_id: Uuid, method_id: Uuid) -> Result<(), DomainError>;

    // Subscriptions

    async fn create_subscription(&self, subscription: Subscription) -> Result<Subscription, DomainError>;

    async fn update_subscription(&self, subscription: Subscription) -> Result<Subscription, DomainError>;

    async fn find_subscription(&self, id: Uuid) -> Result<Option<Subscription>, DomainError>;

    /// Latest non-cancelled subscription of a user
    async fn find_current_subscription(&self, user_id: Uuid) -> Result<Option<Subscription>, DomainError>;

    // Payment intents

    async fn create_intent(&self, intent: PaymentIntent) -> Result<PaymentIntent, DomainError>;

    async fn update_intent(&self, intent: PaymentIntent) -> Result<PaymentIntent, DomainError>;

    async fn find_intent(&self, id: Uuid) -> Result<Option<PaymentIntent>, DomainError>;

    async fn find_intent_by_provider_id(
        &self,
        provider_payment_id: &str,
    ) -> Result<Option<PaymentIntent>, DomainError>;

    /// Intents of a user, newest first
    async fn list_intents(&self, user_id: Uuid) -> Result<Vec<PaymentIntent>, DomainError>;

    // Webhooks

    /// Record a processed notification id. Returns false if it was seen before.
    async fn record_webhook_event(&self, event_id: &str) -> Result<bool, DomainError>;

    /// Drop a recorded notification id so a redelivery is processed again
    async fn forget_webhook_event(&self, event_id: &str) -> Result<(), DomainError>;
}
