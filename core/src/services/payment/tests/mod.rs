mod webhook_tests;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::payment::{PaymentIntent, PaymentMethod, Subscription};
use crate::domain::entities::user::User;
use crate::errors::DomainError;
use crate::repositories::{
    InMemoryPaymentRepository, InMemoryUserRepository, PaymentRepository, UserRepository,
};
use crate::services::payment::{PaymentService, PaymentServiceConfig};

pub const SECRET: &str = "whsec_sombreando_test";

pub struct Fixture {
    pub service: PaymentService,
    pub payments: InMemoryPaymentRepository,
    pub users: InMemoryUserRepository,
}

fn config() -> PaymentServiceConfig {
    PaymentServiceConfig {
        webhook_secret: SECRET.to_string(),
        currency: "BRL".to_string(),
        webhook_tolerance_seconds: 300,
    }
}

impl Fixture {
    pub fn new() -> Self {
        let payments = InMemoryPaymentRepository::new();
        let users = InMemoryUserRepository::new();
        let service = PaymentService::new(Arc::new(payments.clone()), Arc::new(users.clone()), config());
        Self {
            service,
            payments,
            users,
        }
    }

    pub async fn user(&self) -> User {
        let user = User::new(
            format!("{}@sombreando.com", uuid::Uuid::new_v4().simple()),
            format!("user_{}", &uuid::Uuid::new_v4().simple().to_string()[..8]),
            "hash".to_string(),
            "Rafael".to_string(),
            "Costa".to_string(),
        );
        self.users.create(user).await.unwrap()
    }
}

/// Payment repository whose intent updates fail while `failing` is set
pub struct FailingIntentUpdates {
    pub inner: InMemoryPaymentRepository,
    pub failing: AtomicBool,
}

impl FailingIntentUpdates {
    pub fn new(inner: InMemoryPaymentRepository) -> Self {
        Self {
            inner,
            failing: AtomicBool::new(true),
        }
    }

    pub fn recover(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl PaymentRepository for FailingIntentUpdates {
    async fn create_method(&self, method: PaymentMethod) -> Result<PaymentMethod, DomainError> {
        self.inner.create_method(method).await
    }

    async fn list_methods(&self, user_id: Uuid) -> Result<Vec<PaymentMethod>, DomainError> {
        self.inner.list_methods(user_id).await
    }

    async fn find_method(&self, id: Uuid) -> Result<Option<PaymentMethod>, DomainError> {
        self.inner.find_method(id).await
    }

    async fn delete_method(&self, id: Uuid) -> Result<bool, DomainError> {
        self.inner.delete_method(id).await
    }

    async fn set_default_method(&self, user_id: Uuid, method_id: Uuid) -> Result<(), DomainError> {
        self.inner.set_default_method(user_id, method_id).await
    }

    async fn create_subscription(&self, subscription: Subscription) -> Result<Subscription, DomainError> {
        self.inner.create_subscription(subscription).await
    }

    async fn update_subscription(&self, subscription: Subscription) -> Result<Subscription, DomainError> {
        self.inner.update_subscription(subscription).await
    }

    async fn find_subscription(&self, id: Uuid) -> Result<Option<Subscription>, DomainError> {
        self.inner.find_subscription(id).await
    }

    async fn find_current_subscription(&self, user_id: Uuid) -> Result<Option<Subscription>, DomainError> {
        self.inner.find_current_subscription(user_id).await
    }

    async fn create_intent(&self, intent: PaymentIntent) -> Result<PaymentIntent, DomainError> {
        self.inner.create_intent(intent).await
    }

    async fn update_intent(&self, intent: PaymentIntent) -> Result<PaymentIntent, DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::internal("connection reset"));
        }
        self.inner.update_intent(intent).await
    }

    async fn find_intent(&self, id: Uuid) -> Result<Option<PaymentIntent>, DomainError> {
        self.inner.find_intent(id).await
    }

    async fn find_intent_by_provider_id(
        &self,
        provider_payment_id: &str,
    ) -> Result<Option<PaymentIntent>, DomainError> {
        self.inner.find_intent_by_provider_id(provider_payment_id).await
    }

    async fn list_intents(&self, user_id: Uuid) -> Result<Vec<PaymentIntent>, DomainError> {
        self.inner.list_intents(user_id).await
    }

    async fn record_webhook_event(&self, event_id: &str) -> Result<bool, DomainError> {
        self.inner.record_webhook_event(event_id).await
    }

    async fn forget_webhook_event(&self, event_id: &str) -> Result<(), DomainError> {
        self.inner.forget_webhook_event(event_id).await
    }
}

/// Service over a repository that fails intent updates until recovered
pub fn failing_service(
    repository: Arc<FailingIntentUpdates>,
    users: InMemoryUserRepository,
) -> PaymentService {
    PaymentService::new(repository, Arc::new(users), config())
}
