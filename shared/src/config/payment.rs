//! Payment gateway (Mercado Pago) configuration

use serde::{Deserialize, Serialize};
use std::env;

use super::env_parse;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentConfig {
    /// Gateway access token, forwarded to the mobile checkout
    pub access_token: Option<String>,

    /// Secret shared with the gateway for webhook signatures
    pub webhook_secret: String,

    /// ISO 4217 currency for charges
    pub currency: String,

    /// Maximum accepted age of a signed webhook, in seconds
    pub webhook_tolerance_seconds: i64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            webhook_secret: String::new(),
            currency: String::from("BRL"),
            webhook_tolerance_seconds: 300,
        }
    }
}

impl PaymentConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            access_token: env::var("MERCADOPAGO_ACCESS_TOKEN").ok(),
            webhook_secret: env::var("MERCADOPAGO_WEBHOOK_SECRET").unwrap_or_default(),
            currency: env::var("PAYMENT_CURRENCY").unwrap_or(defaults.currency),
            webhook_tolerance_seconds: env_parse(
                "MERCADOPAGO_WEBHOOK_TOLERANCE_SECONDS",
                defaults.webhook_tolerance_seconds,
            ),
        }
    }
}
