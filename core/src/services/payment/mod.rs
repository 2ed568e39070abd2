//! Payments backed by Mercado Pago
//!
//! Local records mirror the gateway. State changes arrive through signed
//! webhook notifications.

mod config;
mod service;
mod webhook;

#[cfg(test)]
mod tests;

pub use config::PaymentServiceConfig;
pub use service::{NewPaymentMethod, PaymentService, SubscriptionCheckout, WebhookOutcome};
pub use webhook::{
    build_manifest, compute_signature, verify_signature, WebhookData, WebhookEvent,
    PAYMENT_EVENT, SUBSCRIPTION_EVENT,
};
