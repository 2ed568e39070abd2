//! Outbound email integration

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A plain-text email ready to send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Trait for email delivery backends
#[async_trait]
pub trait EmailServiceTrait: Send + Sync {
    /// Send a message, returning the provider's message id
    async fn send_email(&self, message: EmailMessage) -> Result<String, String>;
}
