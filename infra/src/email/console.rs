use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use sb_core::services::{EmailMessage, EmailServiceTrait};

use super::mask_email;

/// Logs outgoing messages instead of delivering them
pub struct ConsoleEmailService {
    from_address: String,
}

impl ConsoleEmailService {
    pub fn new(from_address: impl Into<String>) -> Self {
        Self {
            from_address: from_address.into(),
        }
    }
}

#[async_trait]
impl EmailServiceTrait for ConsoleEmailService {
    async fn send_email(&self, message: EmailMessage) -> Result<String, String> {
        let id = format!("console-{}", Uuid::new_v4());
        info!(
            message_id = %id,
            from = %self.from_address,
            to = %mask_email(&message.to),
            subject = %message.subject,
            "Email (console backend)\n{}",
            message.body
        );
        Ok(id)
    }
}
