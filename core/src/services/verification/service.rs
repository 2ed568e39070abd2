//! Main verification service implementation

use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::domain::entities::verification_token::{EmailVerificationToken, TokenPurpose};
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::VerificationTokenRepository;

use super::config::VerificationServiceConfig;
use super::templates::render_verification_email;
use super::traits::EmailServiceTrait;
use super::types::SendCodeResult;

/// Verification service for emailed one-time codes
pub struct VerificationService {
    repository: Arc<dyn VerificationTokenRepository>,
    email_service: Arc<dyn EmailServiceTrait>,
    config: VerificationServiceConfig,
}

impl VerificationService {
    /// Create a new verification service
    ///
    /// # Arguments
    ///
    /// * `repository` - Token storage
    /// * `email_service` - Email delivery backend
    /// * `config` - Service configuration
    pub fn new(
        repository: Arc<dyn VerificationTokenRepository>,
        email_service: Arc<dyn EmailServiceTrait>,
        config: VerificationServiceConfig,
    ) -> Self {
        Self {
            repository,
            email_service,
            config,
        }
    }

    /// Send a fresh code for `purpose` to the user's email
    ///
    /// This method:
    /// 1. Deletes previous unused codes of the same purpose
    /// 2. Generates and stores a new code
    /// 3. Emails it
    ///
    /// A delivery failure returns `EmailServiceFailure`; the stored code
    /// stays valid so a later resend or a delayed email still works.
    pub async fn send_code(&self, user: &User, purpose: TokenPurpose) -> DomainResult<SendCodeResult> {
        let replaced = self.repository.delete_unused(user.id, purpose).await?;
        if replaced > 0 {
            tracing::debug!(user_id = %user.id, purpose = %purpose, replaced, "Replaced unused codes");
        }

        let token = EmailVerificationToken::new_with_expiration(
            user.id,
            purpose,
            Duration::hours(self.config.code_expiration_hours),
        );
        let token = self.repository.create(token).await?;

        let message = render_verification_email(
            user,
            purpose,
            &token.code,
            self.config.code_expiration_hours,
        );

        let message_id = match self.email_service.send_email(message).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(
                    user_id = %user.id,
                    purpose = %purpose,
                    error = %e,
                    event = "verification_email_failed",
                    "Failed to send verification email"
                );
                return Err(AuthError::EmailServiceFailure.into());
            }
        };

        tracing::info!(
            user_id = %user.id,
            purpose = %purpose,
            message_id = %message_id,
            event = "verification_email_sent",
            "Verification code sent"
        );

        Ok(SendCodeResult {
            next_resend_at: token.created_at + Duration::seconds(self.config.resend_cooldown_seconds),
            token,
            message_id,
        })
    }

    /// Check a code against the latest unused token of `purpose`
    ///
    /// Every attempt is persisted, including failed ones.
    pub async fn verify_code(&self, user_id: Uuid, code: &str, purpose: TokenPurpose) -> DomainResult<()> {
        let mut token = self
            .repository
            .find_latest_unused(user_id, purpose)
            .await?
            .ok_or(DomainError::Auth(AuthError::InvalidVerificationCode))?;

        let result = token.verify(code);

        // Expired or exhausted tokens were not modified
        if token.attempts > 0 {
            self.repository.update(token.clone()).await?;
        }

        match &result {
            Ok(()) => tracing::info!(
                user_id = %user_id,
                purpose = %purpose,
                event = "verification_code_accepted",
                "Verification code accepted"
            ),
            Err(e) => tracing::warn!(
                user_id = %user_id,
                purpose = %purpose,
                attempts = token.attempts,
                error = %e,
                event = "verification_code_rejected",
                "Verification code rejected"
            ),
        }

        result.map_err(DomainError::from)
    }

    /// Fails with `ResendTooSoon` while the last code is inside the cooldown
    pub async fn ensure_resend_allowed(&self, user_id: Uuid, purpose: TokenPurpose) -> DomainResult<()> {
        if let Some(latest) = self.repository.find_latest(user_id, purpose).await? {
            let next_allowed = latest.created_at + Duration::seconds(self.config.resend_cooldown_seconds);
            let now = Utc::now();
            if next_allowed > now {
                let seconds = (next_allowed - now).num_seconds().max(1) as u64;
                return Err(AuthError::ResendTooSoon { seconds }.into());
            }
        }
        Ok(())
    }

    /// Delete expired codes
    pub async fn cleanup_expired(&self) -> DomainResult<u64> {
        self.repository.delete_expired().await
    }
}
