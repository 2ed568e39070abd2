//! In-memory email backend for tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use sb_core::services::{EmailMessage, EmailServiceTrait};

/// Records every message; can be switched into a failing mode
#[derive(Clone, Default)]
pub struct MockEmailService {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    failing: Arc<AtomicBool>,
}

impl MockEmailService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    pub fn last_to(&self, to: &str) -> Option<EmailMessage> {
        self.sent().into_iter().rev().find(|m| m.to == to)
    }

    /// First six-digit run in the latest message to `to`
    pub fn last_code_for(&self, to: &str) -> Option<String> {
        let body = self.last_to(to)?.body;
        let chars: Vec<char> = body.chars().collect();
        chars
            .windows(6)
            .find(|w| w.iter().all(|c| c.is_ascii_digit()))
            .map(|w| w.iter().collect())
    }
}

#[async_trait]
impl EmailServiceTrait for MockEmailService {
    async fn send_email(&self, message: EmailMessage) -> Result<String, String> {
        if self.failing.load(Ordering::SeqCst) {
            return Err("mock email backend is failing".to_string());
        }
        let mut sent = self
            .sent
            .lock()
            .map_err(|_| "mock email outbox poisoned".to_string())?;
        sent.push(message);
        Ok(format!("mock-{}", sent.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(to: &str, body: &str) -> EmailMessage {
        EmailMessage {
            to: to.to_string(),
            subject: "Código".to_string(),
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn test_records_messages_and_extracts_code() {
        let mock = MockEmailService::new();
        mock.send_email(message("a@x.com", "Seu código é 123456.")).await.unwrap();
        mock.send_email(message("b@x.com", "Seu código é 654321.")).await.unwrap();

        assert_eq!(mock.sent().len(), 2);
        assert_eq!(mock.last_code_for("a@x.com").as_deref(), Some("123456"));
        assert_eq!(mock.last_code_for("c@x.com"), None);
    }

    #[tokio::test]
    async fn test_failing_mode() {
        let mock = MockEmailService::new();
        mock.set_failing(true);
        assert!(mock.send_email(message("a@x.com", "x")).await.is_err());
        mock.set_failing(false);
        assert!(mock.send_email(message("a@x.com", "x")).await.is_ok());
        assert_eq!(mock.sent().len(), 1);
    }
}
