//! Application state shared by every worker

use std::sync::Arc;

use sb_core::repositories::{
    InMemoryLoginAttemptRepository, InMemoryMapMarkerRepository, InMemoryPaymentRepository,
    InMemorySessionRepository, InMemoryTokenRepository, InMemoryUserProfileRepository,
    InMemoryUserRepository, InMemoryVerificationTokenRepository, LoginAttemptRepository,
    MapMarkerRepository, PaymentRepository, SessionRepository, TokenRepository, UserProfileRepository,
    UserRepository, VerificationTokenRepository,
};
use sb_core::services::{
    AuthService, AuthServiceConfig, CleanupConfig, CleanupService, EmailServiceTrait, HealthProbe, MapService,
    MapServiceConfig, PasswordService, PaymentService, PaymentServiceConfig, RateLimiterTrait, TokenService,
    TokenServiceConfig, VerificationService, VerificationServiceConfig,
};
use sb_infra::database::{
    PostgresLoginAttemptRepository, PostgresMapMarkerRepository, PostgresPaymentRepository,
    PostgresSessionRepository, PostgresTokenRepository, PostgresUserProfileRepository,
    PostgresUserRepository, PostgresVerificationTokenRepository,
};
use sb_shared::AppConfig;
use sqlx::PgPool;

/// One implementation of every repository trait
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenRepository>,
    pub verification_tokens: Arc<dyn VerificationTokenRepository>,
    pub login_attempts: Arc<dyn LoginAttemptRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub profiles: Arc<dyn UserProfileRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub markers: Arc<dyn MapMarkerRepository>,
}

impl Repositories {
    /// Process-local storage, for development and tests
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            tokens: Arc::new(InMemoryTokenRepository::new()),
            verification_tokens: Arc::new(InMemoryVerificationTokenRepository::new()),
            login_attempts: Arc::new(InMemoryLoginAttemptRepository::new()),
            sessions: Arc::new(InMemorySessionRepository::new()),
            profiles: Arc::new(InMemoryUserProfileRepository::new()),
            payments: Arc::new(InMemoryPaymentRepository::new()),
            markers: Arc::new(InMemoryMapMarkerRepository::new()),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            tokens: Arc::new(PostgresTokenRepository::new(pool.clone())),
            verification_tokens: Arc::new(PostgresVerificationTokenRepository::new(pool.clone())),
            login_attempts: Arc::new(PostgresLoginAttemptRepository::new(pool.clone())),
            sessions: Arc::new(PostgresSessionRepository::new(pool.clone())),
            profiles: Arc::new(PostgresUserProfileRepository::new(pool.clone())),
            payments: Arc::new(PostgresPaymentRepository::new(pool.clone())),
            markers: Arc::new(PostgresMapMarkerRepository::new(pool)),
        }
    }

    pub fn cleanup_service(&self, config: CleanupConfig) -> CleanupService {
        CleanupService::new(
            self.verification_tokens.clone(),
            self.tokens.clone(),
            self.sessions.clone(),
            self.login_attempts.clone(),
            config,
        )
    }
}

/// Services and settings reachable from handlers through `web::Data`
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: Arc<AuthService>,
    pub tokens: Arc<TokenService>,
    pub payments: Arc<PaymentService>,
    pub maps: Arc<MapService>,
    pub rate_limiter: Arc<dyn RateLimiterTrait>,
    pub probes: Vec<Arc<dyn HealthProbe>>,
}

impl AppState {
    /// Wire the services over the given storage and outbound integrations
    pub fn build(
        config: AppConfig,
        repositories: &Repositories,
        email: Arc<dyn EmailServiceTrait>,
        rate_limiter: Arc<dyn RateLimiterTrait>,
        probes: Vec<Arc<dyn HealthProbe>>,
    ) -> Self {
        Self::build_with_password_service(
            config,
            repositories,
            email,
            rate_limiter,
            probes,
            PasswordService::default(),
        )
    }

    /// Same as [`AppState::build`] with an explicit bcrypt cost
    pub fn build_with_password_service(
        config: AppConfig,
        repositories: &Repositories,
        email: Arc<dyn EmailServiceTrait>,
        rate_limiter: Arc<dyn RateLimiterTrait>,
        probes: Vec<Arc<dyn HealthProbe>>,
        password_service: PasswordService,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(
            repositories.tokens.clone(),
            TokenServiceConfig::from(&config.jwt),
        ));
        let verification = Arc::new(VerificationService::new(
            repositories.verification_tokens.clone(),
            email,
            VerificationServiceConfig::default(),
        ));

        let auth = Arc::new(AuthService::new(
            repositories.users.clone(),
            repositories.login_attempts.clone(),
            repositories.sessions.clone(),
            repositories.profiles.clone(),
            verification,
            tokens.clone(),
            password_service,
            rate_limiter.clone(),
            AuthServiceConfig::with_rate_limit(config.rate_limit.clone()),
        ));
        let payments = Arc::new(PaymentService::new(
            repositories.payments.clone(),
            repositories.users.clone(),
            PaymentServiceConfig::from(&config.payment),
        ));
        let maps = Arc::new(MapService::new(
            repositories.markers.clone(),
            MapServiceConfig::from(&config.maps),
        ));

        Self {
            config: Arc::new(config),
            auth,
            tokens,
            payments,
            maps,
            rate_limiter,
            probes,
        }
    }

    pub fn trusted_proxies(&self) -> &[String] {
        &self.config.server.trusted_proxies
    }
}
