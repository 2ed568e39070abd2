//! Main authentication service implementation

use chrono::{TimeZone, Utc};
use rand::Rng;
use sb_shared::validation::{
    is_email_domain_allowed, is_valid_email, is_valid_username, is_valid_website,
    normalize_email, normalize_username, username_candidates,
};
use sb_shared::utils::parse_device_info;
use sb_shared::RateLimitRule;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::login_attempt::{LoginAttempt, LoginFailureReason};
use crate::domain::entities::session::UserSession;
use crate::domain::entities::token::Claims;
use crate::domain::entities::user::{ProfileUpdate, User};
use crate::domain::entities::user_profile::{
    UserProfile, UserProfileUpdate, MAX_BIO_LENGTH, MAX_LOCATION_LENGTH, MAX_TIMEZONE_LENGTH,
    MAX_WEBSITE_LENGTH,
};
use crate::domain::entities::verification_token::TokenPurpose;
use crate::domain::value_objects::{
    AccountProfile, AuthResponse, Availability, LoginOutcome, TwoFactorToggle, UserStats,
};
use crate::errors::{AuthError, DomainError, DomainResult, TokenError, ValidationError};
use crate::repositories::{
    LoginAttemptRepository, SessionRepository, UserProfileRepository, UserRepository,
};
use crate::services::password::PasswordService;
use crate::services::rate_limit::{rate_limit_key, RateLimiterTrait};
use crate::services::token::TokenService;
use crate::services::verification::VerificationService;

use super::config::AuthServiceConfig;
use super::types::{LoginInput, RegisterInput, RequestContext};

const MAX_NAME_LENGTH: usize = 150;
const MAX_PHONE_LENGTH: usize = 20;
const MAX_COMPANY_LENGTH: usize = 200;

/// Authentication service for managing the complete account lifecycle
pub struct AuthService {
    /// User repository for database operations
    user_repository: Arc<dyn UserRepository>,
    /// Login attempts, for the security log and statistics
    login_attempt_repository: Arc<dyn LoginAttemptRepository>,
    session_repository: Arc<dyn SessionRepository>,
    /// Extended profiles and preferences
    profile_repository: Arc<dyn UserProfileRepository>,
    /// Service for emailed codes
    verification_service: Arc<VerificationService>,
    /// Token service for JWT management
    token_service: Arc<TokenService>,
    password_service: PasswordService,
    /// Rate limiter for preventing abuse
    rate_limiter: Arc<dyn RateLimiterTrait>,
    /// Service configuration
    config: AuthServiceConfig,
}

impl AuthService {
    /// Create a new authentication service
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        login_attempt_repository: Arc<dyn LoginAttemptRepository>,
        session_repository: Arc<dyn SessionRepository>,
        profile_repository: Arc<dyn UserProfileRepository>,
        verification_service: Arc<VerificationService>,
        token_service: Arc<TokenService>,
        password_service: PasswordService,
        rate_limiter: Arc<dyn RateLimiterTrait>,
        config: AuthServiceConfig,
    ) -> Self {
        Self {
            user_repository,
            login_attempt_repository,
            session_repository,
            profile_repository,
            verification_service,
            token_service,
            password_service,
            rate_limiter,
            config,
        }
    }

    /// Count one request against `action:identifier`.
    ///
    /// A failing limiter backend lets the request through; availability of
    /// login matters more than exact throttling.
    async fn enforce_rate_limit(
        &self,
        action: &str,
        identifier: &str,
        rule: RateLimitRule,
    ) -> DomainResult<()> {
        if !self.config.rate_limit.enabled {
            return Ok(());
        }

        let key = rate_limit_key(action, identifier);
        match self.rate_limiter.check_rule(&key, rule).await {
            Ok(status) if status.allowed => Ok(()),
            Ok(status) => {
                tracing::warn!(
                    key = %key,
                    retry_after = status.retry_after_seconds,
                    event = "rate_limit_exceeded",
                    "Rate limit exceeded"
                );
                Err(AuthError::RateLimitExceeded {
                    seconds: status.retry_after_seconds,
                }
                .into())
            }
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Rate limiter unavailable");
                Ok(())
            }
        }
    }

    async fn record_attempt(&self, attempt: LoginAttempt) {
        if let Err(e) = self.login_attempt_repository.create(attempt).await {
            tracing::error!(error = %e, "Failed to record login attempt");
        }
    }

    async fn record_failure(&self, email: &str, reason: LoginFailureReason, context: &RequestContext) {
        let attempt = LoginAttempt::failure(email, reason)
            .with_request_context(context.ip_address.clone(), context.user_agent.clone());
        self.record_attempt(attempt).await;
    }

    /// Loads a user that may still use the API
    async fn load_active_user(&self, user_id: Uuid) -> DomainResult<User> {
        let user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::Auth(AuthError::UserNotFound))?;
        if !user.is_active {
            return Err(AuthError::AccountInactive.into());
        }
        Ok(user)
    }

    fn validate_email(email: &str) -> DomainResult<()> {
        if !is_valid_email(email) {
            return Err(ValidationError::InvalidEmail.into());
        }
        if !is_email_domain_allowed(email) {
            return Err(ValidationError::EmailDomainNotAllowed.into());
        }
        Ok(())
    }

    fn validate_name(field: &str, value: &str) -> DomainResult<()> {
        if value.trim().is_empty() {
            return Err(ValidationError::RequiredField {
                field: field.to_string(),
            }
            .into());
        }
        Self::validate_length(field, value, MAX_NAME_LENGTH)
    }

    fn validate_length(field: &str, value: &str, max: usize) -> DomainResult<()> {
        if value.chars().count() > max {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max,
            }
            .into());
        }
        Ok(())
    }

    /// Register a new account and email a verification code
    ///
    /// The account is created unverified. If the email cannot be sent the
    /// account is kept and the user can ask for a resend.
    pub async fn register(&self, input: RegisterInput, context: &RequestContext) -> DomainResult<User> {
        self.enforce_rate_limit(
            "register",
            context.rate_limit_identifier(),
            self.config.rate_limit.register_per_ip,
        )
        .await?;

        let email = normalize_email(&input.email);
        Self::validate_email(&email)?;

        let username = normalize_username(&input.username);
        if !is_valid_username(&username) {
            return Err(ValidationError::InvalidFormat {
                field: "username".to_string(),
            }
            .into());
        }

        Self::validate_name("first_name", &input.first_name)?;
        Self::validate_name("last_name", &input.last_name)?;

        if input.password != input.password_confirm {
            return Err(AuthError::PasswordMismatch.into());
        }
        self.password_service.validate(&input.password)?;

        if self.user_repository.email_exists(&email).await? {
            return Err(AuthError::EmailAlreadyExists.into());
        }
        if self.user_repository.username_exists(&username).await? {
            return Err(AuthError::UsernameAlreadyExists.into());
        }

        let password_hash = self.password_service.hash(&input.password)?;
        let mut user = User::new(
            email,
            username,
            password_hash,
            input.first_name.trim().to_string(),
            input.last_name.trim().to_string(),
        );
        let profile = ProfileUpdate {
            phone: input.phone,
            company_name: input.company_name,
            ..Default::default()
        };
        Self::validate_profile(&profile)?;
        user.update_profile(profile);

        let user = self.user_repository.create(user).await?;
        self.profile_repository.save(UserProfile::new(user.id)).await?;

        tracing::info!(
            user_id = %user.id,
            ip = context.ip_address.as_deref().unwrap_or("unknown"),
            event = "user_registered",
            "New user registered"
        );

        if let Err(e) = self
            .verification_service
            .send_code(&user, TokenPurpose::EmailVerification)
            .await
        {
            tracing::warn!(user_id = %user.id, error = %e, "Verification email not sent after registration");
        }

        Ok(user)
    }

    /// Authenticate with email and password
    ///
    /// This method:
    /// 1. Checks the per-IP login budget
    /// 2. Verifies the credentials, then verification and active status
    /// 3. Handles the emailed second factor when enabled
    /// 4. Opens a session and issues tokens
    ///
    /// Every outcome is written to the login attempt log.
    pub async fn login(&self, input: LoginInput, context: &RequestContext) -> DomainResult<LoginOutcome> {
        let email = normalize_email(&input.email);

        if let Err(e) = self
            .enforce_rate_limit(
                "login",
                context.rate_limit_identifier(),
                self.config.rate_limit.login_per_ip,
            )
            .await
        {
            self.record_failure(&email, LoginFailureReason::RateLimited, context)
                .await;
            return Err(e);
        }

        let user = match self.user_repository.find_by_email(&email).await? {
            Some(user) if self.password_service.verify(&input.password, &user.password_hash) => user,
            _ => {
                self.record_failure(&email, LoginFailureReason::InvalidCredentials, context)
                    .await;
                tracing::warn!(email = %email, event = "login_failed", "Invalid credentials");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !user.is_verified {
            self.record_failure(&email, LoginFailureReason::EmailNotVerified, context)
                .await;
            return Err(AuthError::EmailNotVerified.into());
        }
        if !user.is_active {
            self.record_failure(&email, LoginFailureReason::AccountInactive, context)
                .await;
            return Err(AuthError::AccountInactive.into());
        }

        if user.is_2fa_enabled {
            match input.verification_code.as_deref() {
                None | Some("") => {
                    self.verification_service
                        .send_code(&user, TokenPurpose::Login2fa)
                        .await?;
                    // the attempt is recorded once the code step completes
                    tracing::info!(user_id = %user.id, event = "login_2fa_required", "Second factor required");
                    return Ok(LoginOutcome::TwoFactorRequired);
                }
                Some(code) => {
                    if let Err(e) = self
                        .verification_service
                        .verify_code(user.id, code, TokenPurpose::Login2fa)
                        .await
                    {
                        self.record_failure(&email, LoginFailureReason::InvalidTwoFactorCode, context)
                            .await;
                        return Err(e);
                    }
                }
            }
        }

        let mut user = user;
        user.record_login(context.ip_address.clone());
        let user = self.user_repository.update(user).await?;

        let device_info = context
            .user_agent
            .as_deref()
            .map(parse_device_info)
            .unwrap_or_default();
        let session = self
            .session_repository
            .create(UserSession::new(
                user.id,
                context.ip_address.clone(),
                context.user_agent.clone(),
                device_info,
            ))
            .await?;

        let token_pair = self.token_service.generate_tokens(&user, session.id).await?;

        self.record_attempt(
            LoginAttempt::success(email)
                .with_request_context(context.ip_address.clone(), context.user_agent.clone()),
        )
        .await;

        tracing::info!(
            user_id = %user.id,
            session_id = %session.id,
            event = "login_success",
            "User logged in"
        );

        Ok(LoginOutcome::Authenticated(Box::new(
            AuthResponse::from_token_pair(token_pair, user),
        )))
    }

    /// End the session behind `claims`
    ///
    /// Revokes the given refresh token and every token of the session, and
    /// blacklists the access token until it expires.
    pub async fn logout(&self, claims: &Claims, refresh_token: Option<&str>) -> DomainResult<()> {
        if let Some(refresh_token) = refresh_token {
            self.token_service.revoke_refresh_token(refresh_token).await?;
        }
        self.token_service.blacklist_access_token(claims).await?;

        if let Ok(session_id) = claims.session_id() {
            if let Some(mut session) = self.session_repository.find_by_id(session_id).await? {
                session.deactivate();
                self.session_repository.update(session).await?;
            }
            self.token_service.revoke_for_session(session_id).await?;
        }

        tracing::info!(user_id = %claims.sub, event = "logout", "User logged out");
        Ok(())
    }

    /// Rotate a refresh token
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<AuthResponse> {
        let stored = self.token_service.inspect_refresh_token(refresh_token).await?;

        let user = self.load_active_user(stored.user_id).await?;

        match self.session_repository.find_by_id(stored.session_id).await? {
            Some(session) if !session.is_usable() => {
                return Err(TokenError::TokenRevoked.into());
            }
            Some(mut session) => {
                session.touch();
                self.session_repository.update(session).await?;
            }
            None => {}
        }

        let token_pair = self.token_service.refresh_tokens(refresh_token, &user).await?;
        Ok(AuthResponse::from_token_pair(token_pair, user))
    }

    pub async fn get_profile(&self, user_id: Uuid) -> DomainResult<User> {
        self.load_active_user(user_id).await
    }

    /// Stored profile, or the defaults when none was saved yet
    async fn load_user_profile(&self, user_id: Uuid) -> DomainResult<UserProfile> {
        Ok(self
            .profile_repository
            .find_by_user(user_id)
            .await?
            .unwrap_or_else(|| UserProfile::new(user_id)))
    }

    /// The account with its extended profile
    pub async fn get_account(&self, user_id: Uuid) -> DomainResult<AccountProfile> {
        let user = self.load_active_user(user_id).await?;
        let profile = self.load_user_profile(user_id).await?;
        Ok(AccountProfile { user, profile })
    }

    fn validate_preferences(update: &UserProfileUpdate) -> DomainResult<()> {
        if let Some(bio) = &update.bio {
            Self::validate_length("bio", bio, MAX_BIO_LENGTH)?;
        }
        if let Some(location) = &update.location {
            Self::validate_length("location", location, MAX_LOCATION_LENGTH)?;
        }
        if let Some(website) = &update.website {
            let website = website.trim();
            Self::validate_length("website", website, MAX_WEBSITE_LENGTH)?;
            if !website.is_empty() && !is_valid_website(website) {
                return Err(ValidationError::InvalidFormat {
                    field: "website".to_string(),
                }
                .into());
            }
        }
        if let Some(timezone) = &update.timezone {
            if timezone.trim().is_empty() {
                return Err(ValidationError::RequiredField {
                    field: "timezone".to_string(),
                }
                .into());
            }
            Self::validate_length("timezone", timezone, MAX_TIMEZONE_LENGTH)?;
        }
        if let Some(Some(birth_date)) = update.birth_date {
            if birth_date > Utc::now().date_naive() {
                return Err(ValidationError::InvalidFormat {
                    field: "birth_date".to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Update account fields and the extended profile together.
    ///
    /// Both parts are validated before anything is written.
    pub async fn update_account(
        &self,
        user_id: Uuid,
        update: ProfileUpdate,
        preferences: UserProfileUpdate,
    ) -> DomainResult<AccountProfile> {
        Self::validate_profile(&update)?;
        Self::validate_preferences(&preferences)?;

        let user = self.update_profile(user_id, update).await?;
        let mut profile = self.load_user_profile(user_id).await?;
        if !preferences.is_empty() {
            profile.apply(UserProfileUpdate {
                bio: preferences.bio.map(|s| s.trim().to_string()),
                location: preferences.location.map(|s| s.trim().to_string()),
                website: preferences.website.map(|s| s.trim().to_string()),
                timezone: preferences.timezone.map(|s| s.trim().to_string()),
                ..preferences
            });
            profile = self.profile_repository.save(profile).await?;
        }
        Ok(AccountProfile { user, profile })
    }

    fn validate_profile(update: &ProfileUpdate) -> DomainResult<()> {
        if let Some(first_name) = &update.first_name {
            Self::validate_name("first_name", first_name)?;
        }
        if let Some(last_name) = &update.last_name {
            Self::validate_name("last_name", last_name)?;
        }
        if let Some(phone) = &update.phone {
            Self::validate_length("phone", phone, MAX_PHONE_LENGTH)?;
        }
        if let Some(company_name) = &update.company_name {
            Self::validate_length("company_name", company_name, MAX_COMPANY_LENGTH)?;
        }
        Ok(())
    }

    /// Update name, phone and company; an empty phone or company clears it
    pub async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> DomainResult<User> {
        Self::validate_profile(&update)?;
        let mut user = self.load_active_user(user_id).await?;
        user.update_profile(ProfileUpdate {
            first_name: update.first_name.map(|s| s.trim().to_string()),
            last_name: update.last_name.map(|s| s.trim().to_string()),
            phone: update.phone.map(|s| s.trim().to_string()),
            company_name: update.company_name.map(|s| s.trim().to_string()),
        });
        self.user_repository.update(user).await
    }

    /// Change the password of a logged-in user; every refresh token is revoked
    pub async fn change_password(
        &self,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
        new_password_confirm: &str,
    ) -> DomainResult<()> {
        let mut user = self.load_active_user(user_id).await?;

        if !self.password_service.verify(old_password, &user.password_hash) {
            return Err(AuthError::IncorrectPassword.into());
        }
        if new_password != new_password_confirm {
            return Err(AuthError::PasswordMismatch.into());
        }
        self.password_service.validate(new_password)?;
        if old_password == new_password {
            return Err(AuthError::PasswordUnchanged.into());
        }

        user.set_password_hash(self.password_service.hash(new_password)?);
        let user = self.user_repository.update(user).await?;
        let revoked = self.token_service.revoke_all_for_user(user.id).await?;

        tracing::info!(user_id = %user.id, revoked, event = "password_changed", "Password changed");
        Ok(())
    }

    /// Confirm an email address with the emailed code
    ///
    /// Unknown emails report an invalid code so addresses can't be probed.
    pub async fn verify_email(&self, email: &str, code: &str) -> DomainResult<User> {
        let email = normalize_email(email);
        let mut user = self
            .user_repository
            .find_by_email(&email)
            .await?
            .ok_or(DomainError::Auth(AuthError::InvalidVerificationCode))?;

        if user.is_verified {
            return Err(AuthError::AlreadyVerified.into());
        }

        self.verification_service
            .verify_code(user.id, code, TokenPurpose::EmailVerification)
            .await?;

        user.verify_email();
        let user = self.user_repository.update(user).await?;

        tracing::info!(user_id = %user.id, event = "email_verified", "Email verified");
        Ok(user)
    }

    /// Send a new email verification code
    ///
    /// Unknown emails succeed silently.
    pub async fn resend_verification(&self, email: &str) -> DomainResult<()> {
        let email = normalize_email(email);
        let user = match self.user_repository.find_by_email(&email).await? {
            Some(user) => user,
            None => return Ok(()),
        };

        if user.is_verified {
            return Err(AuthError::AlreadyVerified.into());
        }

        self.verification_service
            .ensure_resend_allowed(user.id, TokenPurpose::EmailVerification)
            .await?;
        self.enforce_rate_limit(
            "verification_email",
            &user.id.to_string(),
            self.config.rate_limit.verification_email_per_user,
        )
        .await?;

        self.verification_service
            .send_code(&user, TokenPurpose::EmailVerification)
            .await?;
        Ok(())
    }

    /// Email a password reset code
    ///
    /// Always succeeds from the caller's point of view so account existence
    /// is not revealed; problems are only logged.
    pub async fn request_password_reset(&self, email: &str) -> DomainResult<()> {
        let email = normalize_email(email);
        let user = match self.user_repository.find_by_email(&email).await? {
            Some(user) if user.is_active => user,
            _ => return Ok(()),
        };

        let allowed = async {
            self.verification_service
                .ensure_resend_allowed(user.id, TokenPurpose::PasswordReset)
                .await?;
            self.enforce_rate_limit(
                "password_reset",
                &user.id.to_string(),
                self.config.rate_limit.verification_email_per_user,
            )
            .await
        }
        .await;

        if let Err(e) = allowed {
            tracing::warn!(user_id = %user.id, error = %e, "Password reset request throttled");
            return Ok(());
        }

        if let Err(e) = self
            .verification_service
            .send_code(&user, TokenPurpose::PasswordReset)
            .await
        {
            tracing::error!(user_id = %user.id, error = %e, "Password reset email not sent");
        }
        Ok(())
    }

    /// Set a new password using an emailed reset code
    pub async fn confirm_password_reset(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
        new_password_confirm: &str,
    ) -> DomainResult<()> {
        let email = normalize_email(email);
        let mut user = match self.user_repository.find_by_email(&email).await? {
            Some(user) if user.is_active => user,
            _ => return Err(AuthError::InvalidVerificationCode.into()),
        };

        if new_password != new_password_confirm {
            return Err(AuthError::PasswordMismatch.into());
        }
        self.password_service.validate(new_password)?;

        self.verification_service
            .verify_code(user.id, code, TokenPurpose::PasswordReset)
            .await?;

        user.set_password_hash(self.password_service.hash(new_password)?);
        let user = self.user_repository.update(user).await?;
        let revoked = self.token_service.revoke_all_for_user(user.id).await?;

        tracing::info!(user_id = %user.id, revoked, event = "password_reset", "Password reset");
        Ok(())
    }

    /// Enable or disable the emailed second factor
    ///
    /// Enabling is a two step flow: without `code` an `account_change` code
    /// is emailed, with it the code is checked and 2FA switched on.
    /// Disabling takes effect immediately.
    pub async fn toggle_two_factor(
        &self,
        user_id: Uuid,
        enable: bool,
        code: Option<&str>,
    ) -> DomainResult<TwoFactorToggle> {
        let mut user = self.load_active_user(user_id).await?;

        if !enable {
            if user.is_2fa_enabled {
                user.set_two_factor(false);
                self.user_repository.update(user).await?;
                tracing::info!(user_id = %user_id, event = "2fa_disabled", "Two-factor disabled");
            }
            return Ok(TwoFactorToggle::Updated { enabled: false });
        }

        if user.is_2fa_enabled {
            return Ok(TwoFactorToggle::Updated { enabled: true });
        }

        match code.filter(|c| !c.is_empty()) {
            None => {
                self.verification_service
                    .send_code(&user, TokenPurpose::AccountChange)
                    .await?;
                Ok(TwoFactorToggle::VerificationRequired)
            }
            Some(code) => {
                self.verification_service
                    .verify_code(user.id, code, TokenPurpose::AccountChange)
                    .await?;
                user.set_two_factor(true);
                self.user_repository.update(user).await?;
                tracing::info!(user_id = %user_id, event = "2fa_enabled", "Two-factor enabled");
                Ok(TwoFactorToggle::Updated { enabled: true })
            }
        }
    }

    pub async fn stats(&self, user_id: Uuid) -> DomainResult<UserStats> {
        let user = self.load_active_user(user_id).await?;
        let now = Utc::now();
        let start_of_day = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|midnight| Utc.from_utc_datetime(&midnight));

        let login_attempts_today = match start_of_day {
            Some(since) => {
                self.login_attempt_repository
                    .count_for_email(&user.email, Some(since))
                    .await?
            }
            None => 0,
        };
        let total_login_attempts = self
            .login_attempt_repository
            .count_for_email(&user.email, None)
            .await?;

        Ok(UserStats {
            login_attempts_today,
            total_login_attempts,
            account_age_days: (now - user.created_at).num_days(),
            is_verified: user.is_verified,
            is_2fa_enabled: user.is_2fa_enabled,
            subscription_plan: user.subscription_plan,
            is_subscription_active: user.is_subscription_active(),
        })
    }

    /// Latest login attempts for the user's email, newest first
    pub async fn security_log(&self, user_id: Uuid) -> DomainResult<Vec<LoginAttempt>> {
        let user = self.load_active_user(user_id).await?;
        self.login_attempt_repository
            .recent_for_email(&user.email, self.config.security_log_limit)
            .await
    }

    pub async fn list_sessions(&self, user_id: Uuid) -> DomainResult<Vec<UserSession>> {
        let sessions = self.session_repository.list_active(user_id).await?;
        Ok(sessions.into_iter().filter(UserSession::is_usable).collect())
    }

    /// Check that verified access token claims still belong to a live
    /// session of an active user
    ///
    /// Access tokens outlive their session otherwise: logout, session
    /// revocation and account deletion all end the session first.
    pub async fn authorize(&self, claims: &Claims) -> DomainResult<()> {
        let user_id = claims
            .user_id()
            .map_err(|_| DomainError::Token(TokenError::InvalidClaims))?;
        let session_id = claims
            .session_id()
            .map_err(|_| DomainError::Token(TokenError::InvalidClaims))?;

        let session_live = match self.session_repository.find_by_id(session_id).await? {
            Some(session) => session.user_id == user_id && session.is_usable(),
            None => false,
        };
        if !session_live {
            return Err(TokenError::TokenRevoked.into());
        }

        match self.user_repository.find_by_id(user_id).await? {
            Some(user) if user.is_active => Ok(()),
            _ => Err(TokenError::TokenRevoked.into()),
        }
    }

    /// Sign out one of the user's sessions
    pub async fn revoke_session(&self, user_id: Uuid, session_id: Uuid) -> DomainResult<()> {
        let mut session = match self.session_repository.find_by_id(session_id).await? {
            Some(session) if session.user_id == user_id => session,
            _ => return Err(AuthError::SessionNotFound.into()),
        };

        session.deactivate();
        self.session_repository.update(session).await?;
        self.token_service.revoke_for_session(session_id).await?;

        tracing::info!(user_id = %user_id, session_id = %session_id, event = "session_revoked", "Session revoked");
        Ok(())
    }

    /// Soft delete the account; its email and username become free again
    pub async fn delete_account(&self, user_id: Uuid) -> DomainResult<()> {
        let mut user = self.load_active_user(user_id).await?;
        user.soft_delete();
        self.user_repository.update(user).await?;

        self.token_service.revoke_all_for_user(user_id).await?;
        self.session_repository.deactivate_all(user_id).await?;

        tracing::info!(user_id = %user_id, event = "account_deleted", "Account deleted");
        Ok(())
    }

    pub async fn check_email_available(&self, email: &str) -> DomainResult<Availability> {
        let email = normalize_email(email);
        Self::validate_email(&email)?;
        if self.user_repository.email_exists(&email).await? {
            Ok(Availability::taken(Vec::new()))
        } else {
            Ok(Availability::available())
        }
    }

    /// Check a username, suggesting free alternatives when it is taken
    pub async fn check_username_available(&self, username: &str) -> DomainResult<Availability> {
        let username = normalize_username(username);
        if !is_valid_username(&username) {
            return Err(ValidationError::InvalidFormat {
                field: "username".to_string(),
            }
            .into());
        }
        if !self.user_repository.username_exists(&username).await? {
            return Ok(Availability::available());
        }

        let wanted = self.config.username_suggestions;
        let mut suggestions = Vec::with_capacity(wanted);
        for candidate in username_candidates(&username, wanted) {
            if !self.user_repository.username_exists(&candidate).await? {
                suggestions.push(candidate);
            }
        }

        // Numbered names are taken too; fall back to random suffixes
        let mut tries = 0;
        while suggestions.len() < wanted && tries < wanted * 4 {
            tries += 1;
            let suffix: u16 = rand::thread_rng().gen_range(100..1000);
            let candidate = format!("{}_{}", username, suffix);
            if suggestions.contains(&candidate) {
                continue;
            }
            if !self.user_repository.username_exists(&candidate).await? {
                suggestions.push(candidate);
            }
        }

        Ok(Availability::taken(suggestions))
    }
}
