//! Verification service module for emailed one-time codes
//!
//! This module provides the verification code workflow:
//! - Code generation, storage and delivery by email
//! - Code verification with attempt tracking
//! - Resend cooldown

mod config;
mod service;
mod templates;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use config::VerificationServiceConfig;
pub use service::VerificationService;
pub use templates::render_verification_email;
pub use traits::{EmailMessage, EmailServiceTrait};
pub use types::SendCodeResult;
