//! Payment service implementation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::payment::{
    PaymentIntent, PaymentMethod, PaymentStatus, Subscription, SubscriptionStatus,
};
use crate::domain::entities::user::SubscriptionPlan;
use crate::errors::{DomainError, DomainResult, PaymentError, ValidationError};
use crate::repositories::{PaymentRepository, UserRepository};

use super::config::PaymentServiceConfig;
use super::webhook::{verify_signature, WebhookEvent, PAYMENT_EVENT, SUBSCRIPTION_EVENT};

const MAX_DESCRIPTION_LENGTH: usize = 255;

/// Card details returned by the gateway's tokenizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPaymentMethod {
    pub provider_id: String,
    pub brand: String,
    pub last_four: String,
    pub exp_month: u32,
    pub exp_year: i32,
}

/// Result of starting a subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionCheckout {
    pub subscription: Subscription,
    /// Charge to complete for paid plans
    pub payment_intent: Option<PaymentIntent>,
}

/// What a webhook notification did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    Processed,
    /// Seen before; nothing changed
    Duplicate,
    /// Unknown type or object; acknowledged without changes
    Ignored,
}

pub struct PaymentService {
    repository: Arc<dyn PaymentRepository>,
    user_repository: Arc<dyn UserRepository>,
    config: PaymentServiceConfig,
}

impl PaymentService {
    pub fn new(
        repository: Arc<dyn PaymentRepository>,
        user_repository: Arc<dyn UserRepository>,
        config: PaymentServiceConfig,
    ) -> Self {
        Self {
            repository,
            user_repository,
            config,
        }
    }

    // Payment methods

    /// Store a tokenized card; a user's first card becomes the default
    pub async fn add_payment_method(
        &self,
        user_id: Uuid,
        input: NewPaymentMethod,
    ) -> DomainResult<PaymentMethod> {
        if input.last_four.len() != 4 || !input.last_four.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidFormat {
                field: "last_four".to_string(),
            }
            .into());
        }
        if !(1..=12).contains(&input.exp_month) {
            return Err(ValidationError::OutOfRange {
                field: "exp_month".to_string(),
                min: "1".to_string(),
                max: "12".to_string(),
            }
            .into());
        }
        if input.provider_id.trim().is_empty() {
            return Err(ValidationError::RequiredField {
                field: "provider_id".to_string(),
            }
            .into());
        }

        let mut method = PaymentMethod::new(
            user_id,
            input.provider_id,
            input.brand.to_lowercase(),
            input.last_four,
            input.exp_month,
            input.exp_year,
        );
        if method.is_expired() {
            return Err(PaymentError::PaymentMethodExpired.into());
        }

        method.is_default = self.repository.list_methods(user_id).await?.is_empty();
        let method = self.repository.create_method(method).await?;

        tracing::info!(
            user_id = %user_id,
            payment_method_id = %method.id,
            event = "payment_method_added",
            "Payment method added"
        );
        Ok(method)
    }

    pub async fn list_payment_methods(&self, user_id: Uuid) -> DomainResult<Vec<PaymentMethod>> {
        self.repository.list_methods(user_id).await
    }

    /// Other users' methods are reported as missing
    async fn owned_method(&self, user_id: Uuid, method_id: Uuid) -> DomainResult<PaymentMethod> {
        match self.repository.find_method(method_id).await? {
            Some(method) if method.user_id == user_id => Ok(method),
            _ => Err(DomainError::not_found("Payment method")),
        }
    }

    /// Remove a card; if it was the default the newest remaining card takes over
    pub async fn remove_payment_method(&self, user_id: Uuid, method_id: Uuid) -> DomainResult<()> {
        let method = self.owned_method(user_id, method_id).await?;
        self.repository.delete_method(method.id).await?;

        if method.is_default {
            if let Some(next) = self.repository.list_methods(user_id).await?.first() {
                self.repository.set_default_method(user_id, next.id).await?;
            }
        }
        Ok(())
    }

    pub async fn set_default_payment_method(
        &self,
        user_id: Uuid,
        method_id: Uuid,
    ) -> DomainResult<PaymentMethod> {
        let mut method = self.owned_method(user_id, method_id).await?;
        self.repository.set_default_method(user_id, method_id).await?;
        method.is_default = true;
        Ok(method)
    }

    // Subscriptions

    /// Move to `plan`
    ///
    /// The free plan applies immediately. Paid plans start `Pending` with a
    /// payment intent for one month; the webhook activates them.
    pub async fn subscribe(&self, user_id: Uuid, plan: SubscriptionPlan) -> DomainResult<SubscriptionCheckout> {
        let mut user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User"))?;

        let current = self.repository.find_current_subscription(user_id).await?;
        if let Some(current) = &current {
            if current.plan == plan && current.status == SubscriptionStatus::Active {
                return Err(PaymentError::AlreadySubscribed {
                    plan: plan.to_string(),
                }
                .into());
            }
        }

        if !plan.is_paid() {
            if let Some(mut previous) = current {
                previous.set_status(SubscriptionStatus::Cancelled);
                self.repository.update_subscription(previous).await?;
            }

            let mut subscription = Subscription::new(user_id, plan);
            subscription.set_status(SubscriptionStatus::Active);
            let subscription = self.repository.create_subscription(subscription).await?;

            user.activate_plan(plan, None);
            self.user_repository.update(user).await?;

            tracing::info!(user_id = %user_id, plan = %plan, event = "subscription_changed", "Moved to free plan");
            return Ok(SubscriptionCheckout {
                subscription,
                payment_intent: None,
            });
        }

        let subscription = self
            .repository
            .create_subscription(Subscription::new(user_id, plan))
            .await?;
        let intent = PaymentIntent::new(
            user_id,
            plan.monthly_price_cents(),
            self.config.currency.clone(),
            format!("Sombreando {} - mensal", plan),
        )
        .for_subscription(subscription.id);
        let intent = self.repository.create_intent(intent).await?;

        tracing::info!(
            user_id = %user_id,
            plan = %plan,
            subscription_id = %subscription.id,
            event = "subscription_started",
            "Subscription pending payment"
        );

        Ok(SubscriptionCheckout {
            subscription,
            payment_intent: Some(intent),
        })
    }

    /// Cancel the current subscription
    ///
    /// The user keeps the paid plan until `subscription_expires_at`.
    pub async fn cancel_subscription(&self, user_id: Uuid) -> DomainResult<Subscription> {
        let mut subscription = self
            .repository
            .find_current_subscription(user_id)
            .await?
            .ok_or(DomainError::Payment(PaymentError::NoActiveSubscription))?;

        subscription.set_status(SubscriptionStatus::Cancelled);
        let subscription = self.repository.update_subscription(subscription).await?;

        tracing::info!(
            user_id = %user_id,
            subscription_id = %subscription.id,
            event = "subscription_cancelled",
            "Subscription cancelled"
        );
        Ok(subscription)
    }

    pub async fn current_subscription(&self, user_id: Uuid) -> DomainResult<Option<Subscription>> {
        self.repository.find_current_subscription(user_id).await
    }

    // Payment intents

    pub async fn create_payment_intent(
        &self,
        user_id: Uuid,
        amount_cents: i64,
        description: &str,
    ) -> DomainResult<PaymentIntent> {
        if amount_cents <= 0 {
            return Err(PaymentError::InvalidAmount.into());
        }
        let description = description.trim();
        if description.is_empty() {
            return Err(ValidationError::RequiredField {
                field: "description".to_string(),
            }
            .into());
        }
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(ValidationError::TooLong {
                field: "description".to_string(),
                max: MAX_DESCRIPTION_LENGTH,
            }
            .into());
        }

        let intent = PaymentIntent::new(
            user_id,
            amount_cents,
            self.config.currency.clone(),
            description.to_string(),
        );
        self.repository.create_intent(intent).await
    }

    pub async fn get_payment_intent(&self, user_id: Uuid, intent_id: Uuid) -> DomainResult<PaymentIntent> {
        match self.repository.find_intent(intent_id).await? {
            Some(intent) if intent.user_id == user_id => Ok(intent),
            _ => Err(DomainError::not_found("Payment intent")),
        }
    }

    pub async fn list_payment_intents(&self, user_id: Uuid) -> DomainResult<Vec<PaymentIntent>> {
        self.repository.list_intents(user_id).await
    }

    // Webhooks

    /// Authenticate a notification before trusting its body
    pub fn verify_webhook_signature(
        &self,
        x_signature: Option<&str>,
        x_request_id: Option<&str>,
        data_id: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        verify_signature(
            &self.config.webhook_secret,
            x_signature,
            x_request_id,
            data_id,
            now,
            self.config.webhook_tolerance_seconds,
        )
        .map_err(|e| {
            tracing::warn!(error = %e, event = "webhook_rejected", "Webhook signature check failed");
            DomainError::from(e)
        })
    }

    /// Apply a verified notification
    ///
    /// The event id is claimed before processing, so a redelivery of a
    /// processed notification is a no-op. The claim is released when
    /// processing fails so the gateway's retry applies it.
    pub async fn handle_webhook(&self, event: WebhookEvent) -> DomainResult<WebhookOutcome> {
        if !self.repository.record_webhook_event(&event.id).await? {
            tracing::info!(event_id = %event.id, "Duplicate webhook ignored");
            return Ok(WebhookOutcome::Duplicate);
        }

        let processed = match event.event_type.as_str() {
            PAYMENT_EVENT => self.handle_payment_event(&event).await,
            SUBSCRIPTION_EVENT => self.handle_subscription_event(&event).await,
            other => {
                tracing::debug!(event_type = other, "Unhandled webhook type");
                Ok(WebhookOutcome::Ignored)
            }
        };
        let outcome = match processed {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(event_id = %event.id, error = %e, "Webhook processing failed");
                if let Err(release) = self.repository.forget_webhook_event(&event.id).await {
                    tracing::error!(event_id = %event.id, error = %release, "Failed to release webhook event");
                }
                return Err(e);
            }
        };

        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            outcome = ?outcome,
            event = "webhook_processed",
            "Webhook processed"
        );
        Ok(outcome)
    }

    async fn handle_payment_event(&self, event: &WebhookEvent) -> DomainResult<WebhookOutcome> {
        let status = match event.data.status.as_deref().and_then(PaymentStatus::from_provider) {
            Some(status) => status,
            None => return Ok(WebhookOutcome::Ignored),
        };

        let by_reference = match parse_reference(&event.data.external_reference) {
            Some(id) => self.repository.find_intent(id).await?,
            None => None,
        };
        let intent = match by_reference {
            Some(intent) => Some(intent),
            None => self.repository.find_intent_by_provider_id(&event.data.id).await?,
        };
        let mut intent = match intent {
            Some(intent) => intent,
            None => {
                tracing::warn!(provider_id = %event.data.id, "Webhook for unknown payment");
                return Ok(WebhookOutcome::Ignored);
            }
        };

        intent.provider_payment_id = Some(event.data.id.clone());
        intent.set_status(status);
        let intent = self.repository.update_intent(intent).await?;

        if status == PaymentStatus::Approved {
            if let Some(subscription_id) = intent.subscription_id {
                if let Some(subscription) = self.repository.find_subscription(subscription_id).await? {
                    if subscription.status == SubscriptionStatus::Pending {
                        self.activate_subscription(subscription).await?;
                    }
                }
            }
        }

        Ok(WebhookOutcome::Processed)
    }

    async fn handle_subscription_event(&self, event: &WebhookEvent) -> DomainResult<WebhookOutcome> {
        let status = match event
            .data
            .status
            .as_deref()
            .and_then(SubscriptionStatus::from_provider)
        {
            Some(status) => status,
            None => return Ok(WebhookOutcome::Ignored),
        };

        let subscription = match parse_reference(&event.data.external_reference) {
            Some(id) => self.repository.find_subscription(id).await?,
            None => None,
        };
        let mut subscription = match subscription {
            Some(subscription) => subscription,
            None => {
                tracing::warn!(provider_id = %event.data.id, "Webhook for unknown subscription");
                return Ok(WebhookOutcome::Ignored);
            }
        };
        subscription.provider_id = Some(event.data.id.clone());

        match status {
            SubscriptionStatus::Active => {
                self.activate_subscription(subscription).await?;
            }
            other => {
                subscription.set_status(other);
                self.repository.update_subscription(subscription).await?;
            }
        }

        Ok(WebhookOutcome::Processed)
    }

    /// Start a billing period and upgrade the user
    async fn activate_subscription(&self, mut subscription: Subscription) -> DomainResult<()> {
        subscription.activate();
        let subscription = self.repository.update_subscription(subscription).await?;

        if let Some(mut user) = self.user_repository.find_by_id(subscription.user_id).await? {
            user.activate_plan(subscription.plan, subscription.current_period_end);
            self.user_repository.update(user).await?;
        }

        tracing::info!(
            user_id = %subscription.user_id,
            subscription_id = %subscription.id,
            plan = %subscription.plan,
            event = "subscription_activated",
            "Subscription activated"
        );
        Ok(())
    }
}

fn parse_reference(reference: &Option<String>) -> Option<Uuid> {
    reference.as_deref().and_then(|r| Uuid::parse_str(r).ok())
}
