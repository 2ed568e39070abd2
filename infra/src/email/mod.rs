//! Email delivery backends
//!
//! - **Console**: writes messages to the log, for development
//! - **Mock**: records messages in memory, for tests
//! - **Http**: posts messages to a transactional email API

use std::sync::Arc;

use tracing::warn;

use sb_core::services::EmailServiceTrait;
use sb_shared::config::email::{EmailBackend, EmailConfig};

pub mod console;
pub mod http;
pub mod mock;

pub use console::ConsoleEmailService;
pub use http::HttpEmailService;
pub use mock::MockEmailService;

/// Create the email service selected by configuration.
///
/// An HTTP backend without an API URL or key falls back to the console
/// backend so development setups still boot.
pub fn create_email_service(config: &EmailConfig) -> Arc<dyn EmailServiceTrait> {
    match config.backend {
        EmailBackend::Console => Arc::new(ConsoleEmailService::new(config.from_address.clone())),
        EmailBackend::Http => match HttpEmailService::from_config(config) {
            Ok(service) => Arc::new(service),
            Err(e) => {
                warn!(error = %e, "HTTP email backend unavailable, using console backend");
                Arc::new(ConsoleEmailService::new(config.from_address.clone()))
            }
        },
    }
}

/// Mask the local part of an address for logs
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain)
        }
        None => "***".to_string(),
    }
}
