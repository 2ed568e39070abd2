//! Types for verification service results

use chrono::{DateTime, Utc};

use crate::domain::entities::verification_token::EmailVerificationToken;

/// Result of sending a verification code
#[derive(Debug, Clone)]
pub struct SendCodeResult {
    /// The token that was stored
    pub token: EmailVerificationToken,
    /// Message id returned by the email backend
    pub message_id: String,
    /// When another code of the same purpose may be requested
    pub next_resend_at: DateTime<Utc>,
}
