//! Transactional email over an HTTP JSON API

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use sb_core::services::{EmailMessage, EmailServiceTrait};
use sb_shared::config::email::EmailConfig;

use super::mask_email;
use crate::InfrastructureError;

const DEFAULT_RETRY_DELAY_MS: u64 = 500;

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: String,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    id: Option<String>,
}

/// Posts messages to `{api_url}` with a bearer API key, retrying transient
/// failures with exponential backoff.
pub struct HttpEmailService {
    client: Client,
    api_url: String,
    api_key: String,
    from: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpEmailService {
    pub fn from_config(config: &EmailConfig) -> Result<Self, InfrastructureError> {
        let api_url = config
            .api_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| InfrastructureError::Config("EMAIL_API_URL is not set".to_string()))?;
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| InfrastructureError::Config("EMAIL_API_KEY is not set".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_url,
            api_key,
            from: format!("{} <{}>", config.from_name, config.from_address),
            max_retries: config.max_retries.max(1),
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        })
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    async fn send_once(&self, message: &EmailMessage) -> Result<String, Attempt> {
        let body = SendRequest {
            from: self.from.clone(),
            to: [message.to.as_str()],
            subject: &message.subject,
            text: &message.body,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Attempt::Retry(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let parsed: SendResponse = response.json().await.unwrap_or(SendResponse { id: None });
            return Ok(parsed.id.unwrap_or_else(|| "accepted".to_string()));
        }

        let detail = format!("email API returned {}", status);
        if is_retryable(status) {
            Err(Attempt::Retry(detail))
        } else {
            Err(Attempt::Fatal(detail))
        }
    }
}

enum Attempt {
    Retry(String),
    Fatal(String),
}

/// Rate limiting and server-side failures are worth retrying
pub(crate) fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[async_trait]
impl EmailServiceTrait for HttpEmailService {
    async fn send_email(&self, message: EmailMessage) -> Result<String, String> {
        let mut attempts = 0;
        let mut delay = self.retry_delay;

        loop {
            attempts += 1;
            debug!(
                "Sending email attempt {}/{} to {}",
                attempts,
                self.max_retries,
                mask_email(&message.to)
            );

            match self.send_once(&message).await {
                Ok(id) => {
                    info!(message_id = %id, to = %mask_email(&message.to), "Email sent");
                    return Ok(id);
                }
                Err(Attempt::Fatal(detail)) => {
                    error!(to = %mask_email(&message.to), "Email rejected: {}", detail);
                    return Err(detail);
                }
                Err(Attempt::Retry(detail)) => {
                    if attempts >= self.max_retries {
                        error!(
                            "Failed to send email after {} attempts: {}",
                            attempts, detail
                        );
                        return Err(format!(
                            "Failed to send email after {} attempts: {}",
                            attempts, detail
                        ));
                    }
                    warn!(
                        "Email attempt {}/{} failed ({}), retrying in {:?}",
                        attempts, self.max_retries, detail, delay
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }
}
