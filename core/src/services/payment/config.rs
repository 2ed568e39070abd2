use sb_shared::PaymentConfig;

#[derive(Debug, Clone)]
pub struct PaymentServiceConfig {
    /// Secret shared with the gateway for webhook signatures
    pub webhook_secret: String,
    /// ISO currency code used for new intents
    pub currency: String,
    /// Maximum accepted age of a webhook timestamp
    pub webhook_tolerance_seconds: i64,
}

impl Default for PaymentServiceConfig {
    fn default() -> Self {
        Self::from(&PaymentConfig::default())
    }
}

impl From<&PaymentConfig> for PaymentServiceConfig {
    fn from(config: &PaymentConfig) -> Self {
        Self {
            webhook_secret: config.webhook_secret.clone(),
            currency: config.currency.clone(),
            webhook_tolerance_seconds: config.webhook_tolerance_seconds,
        }
    }
}
