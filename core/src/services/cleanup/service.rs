use chrono::{Duration, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::domain::entities::session::SESSION_IDLE_DAYS;
use crate::repositories::{
    LoginAttemptRepository, SessionRepository, TokenRepository, VerificationTokenRepository,
};

#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// Seconds between runs
    pub interval_seconds: u64,
    /// Sessions idle longer than this are deactivated
    pub session_idle_days: i64,
    /// Login attempts older than this are deleted
    pub login_attempt_retention_days: i64,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600,
            session_idle_days: SESSION_IDLE_DAYS,
            login_attempt_retention_days: 90,
        }
    }
}

/// Counts from one cleanup run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    pub verification_tokens_deleted: u64,
    /// Refresh tokens plus blacklisted access token ids
    pub tokens_deleted: u64,
    pub sessions_deactivated: u64,
    pub login_attempts_deleted: u64,
    pub errors: Vec<String>,
}

impl CleanupReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn total_cleaned(&self) -> u64 {
        self.verification_tokens_deleted
            + self.tokens_deleted
            + self.sessions_deactivated
            + self.login_attempts_deleted
    }
}

pub struct CleanupService {
    verification_repository: Arc<dyn VerificationTokenRepository>,
    token_repository: Arc<dyn TokenRepository>,
    session_repository: Arc<dyn SessionRepository>,
    login_attempt_repository: Arc<dyn LoginAttemptRepository>,
    config: CleanupConfig,
}

impl CleanupService {
    pub fn new(
        verification_repository: Arc<dyn VerificationTokenRepository>,
        token_repository: Arc<dyn TokenRepository>,
        session_repository: Arc<dyn SessionRepository>,
        login_attempt_repository: Arc<dyn LoginAttemptRepository>,
        config: CleanupConfig,
    ) -> Self {
        Self {
            verification_repository,
            token_repository,
            session_repository,
            login_attempt_repository,
            config,
        }
    }

    /// Run every cleanup step once
    ///
    /// A failing step is recorded in `errors` and does not stop the others.
    pub async fn run_once(&self) -> CleanupReport {
        let mut report = CleanupReport::default();
        let now = Utc::now();

        match self.verification_repository.delete_expired().await {
            Ok(count) => report.verification_tokens_deleted = count,
            Err(e) => {
                error!(error = %e, "Failed to delete expired verification tokens");
                report.errors.push(format!("verification tokens: {}", e));
            }
        }

        match self.token_repository.delete_expired().await {
            Ok(count) => report.tokens_deleted = count,
            Err(e) => {
                error!(error = %e, "Failed to delete expired refresh tokens");
                report.errors.push(format!("refresh tokens: {}", e));
            }
        }

        let idle_cutoff = now - Duration::days(self.config.session_idle_days);
        match self.session_repository.deactivate_stale(idle_cutoff).await {
            Ok(count) => report.sessions_deactivated = count,
            Err(e) => {
                error!(error = %e, "Failed to deactivate idle sessions");
                report.errors.push(format!("sessions: {}", e));
            }
        }

        let retention_cutoff = now - Duration::days(self.config.login_attempt_retention_days);
        match self.login_attempt_repository.delete_before(retention_cutoff).await {
            Ok(count) => report.login_attempts_deleted = count,
            Err(e) => {
                error!(error = %e, "Failed to delete old login attempts");
                report.errors.push(format!("login attempts: {}", e));
            }
        }

        info!(
            verification_tokens = report.verification_tokens_deleted,
            tokens = report.tokens_deleted,
            sessions = report.sessions_deactivated,
            login_attempts = report.login_attempts_deleted,
            event = "cleanup_completed",
            "Cleanup run finished"
        );
        report
    }

    /// Run `run_once` every `interval_seconds` on the current runtime
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        let period = std::time::Duration::from_secs(self.config.interval_seconds.max(1));

        tokio::spawn(async move {
            info!(interval_seconds = period.as_secs(), "Cleanup task started");
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                let report = self.run_once().await;
                if !report.is_success() {
                    warn!(errors = ?report.errors, "Cleanup finished with errors");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::DateTime;
    use sb_shared::utils::DeviceInfo;
    use uuid::Uuid;

    use crate::domain::entities::login_attempt::{LoginAttempt, LoginFailureReason};
    use crate::domain::entities::session::UserSession;
    use crate::domain::entities::token::RefreshToken;
    use crate::domain::entities::verification_token::{EmailVerificationToken, TokenPurpose};
    use crate::errors::DomainError;
    use crate::repositories::{
        InMemoryLoginAttemptRepository, InMemorySessionRepository, InMemoryTokenRepository,
        InMemoryVerificationTokenRepository,
    };

    struct Repos {
        verification: InMemoryVerificationTokenRepository,
        tokens: InMemoryTokenRepository,
        sessions: InMemorySessionRepository,
        attempts: InMemoryLoginAttemptRepository,
    }

    fn service_with(repos: &Repos, sessions: Arc<dyn SessionRepository>) -> CleanupService {
        CleanupService::new(
            Arc::new(repos.verification.clone()),
            Arc::new(repos.tokens.clone()),
            sessions,
            Arc::new(repos.attempts.clone()),
            CleanupConfig::default(),
        )
    }

    fn repos() -> Repos {
        Repos {
            verification: InMemoryVerificationTokenRepository::new(),
            tokens: InMemoryTokenRepository::new(),
            sessions: InMemorySessionRepository::new(),
            attempts: InMemoryLoginAttemptRepository::new(),
        }
    }

    #[tokio::test]
    async fn test_run_once_removes_expired_state() {
        let repos = repos();
        let user_id = Uuid::new_v4();

        let mut expired_code = EmailVerificationToken::new(user_id, TokenPurpose::EmailVerification);
        expired_code.expires_at = Utc::now() - Duration::hours(1);
        repos.verification.create(expired_code).await.unwrap();
        repos
            .verification
            .create(EmailVerificationToken::new(user_id, TokenPurpose::PasswordReset))
            .await
            .unwrap();

        repos
            .tokens
            .save_refresh_token(RefreshToken::new(user_id, Uuid::new_v4(), "old".into(), Duration::seconds(-5)))
            .await
            .unwrap();
        repos
            .tokens
            .save_refresh_token(RefreshToken::new(user_id, Uuid::new_v4(), "new".into(), Duration::days(7)))
            .await
            .unwrap();

        let mut idle = UserSession::new(user_id, None, None, DeviceInfo::default());
        idle.last_activity = Utc::now() - Duration::days(SESSION_IDLE_DAYS + 1);
        repos.sessions.create(idle).await.unwrap();
        repos
            .sessions
            .create(UserSession::new(user_id, None, None, DeviceInfo::default()))
            .await
            .unwrap();

        let mut old_attempt = LoginAttempt::failure("ana@sombreando.com", LoginFailureReason::InvalidCredentials);
        old_attempt.timestamp = Utc::now() - Duration::days(120);
        repos.attempts.create(old_attempt).await.unwrap();

        let service = service_with(&repos, Arc::new(repos.sessions.clone()));
        let report = service.run_once().await;

        assert!(report.is_success());
        assert_eq!(report.verification_tokens_deleted, 1);
        assert_eq!(report.tokens_deleted, 1);
        assert_eq!(report.sessions_deactivated, 1);
        assert_eq!(report.login_attempts_deleted, 1);
        assert_eq!(report.total_cleaned(), 4);
        assert_eq!(repos.sessions.list_active(user_id).await.unwrap().len(), 1);

        // nothing left to do
        assert_eq!(service.run_once().await.total_cleaned(), 0);
    }

    struct FailingSessions;

    #[async_trait]
    impl SessionRepository for FailingSessions {
        async fn create(&self, _: UserSession) -> Result<UserSession, DomainError> {
            Err(DomainError::internal("down"))
        }
        async fn find_by_id(&self, _: Uuid) -> Result<Option<UserSession>, DomainError> {
            Err(DomainError::internal("down"))
        }
        async fn list_active(&self, _: Uuid) -> Result<Vec<UserSession>, DomainError> {
            Err(DomainError::internal("down"))
        }
        async fn update(&self, _: UserSession) -> Result<UserSession, DomainError> {
            Err(DomainError::internal("down"))
        }
        async fn deactivate_all(&self, _: Uuid) -> Result<u64, DomainError> {
            Err(DomainError::internal("down"))
        }
        async fn deactivate_stale(&self, _: DateTime<Utc>) -> Result<u64, DomainError> {
            Err(DomainError::internal("down"))
        }
    }

    #[tokio::test]
    async fn test_failing_step_does_not_stop_others() {
        let repos = repos();
        repos
            .tokens
            .save_refresh_token(RefreshToken::new(Uuid::new_v4(), Uuid::new_v4(), "x".into(), Duration::seconds(-5)))
            .await
            .unwrap();

        let report = service_with(&repos, Arc::new(FailingSessions)).run_once().await;

        assert!(!report.is_success());
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("sessions"));
        assert_eq!(report.tokens_deleted, 1);
    }
}
