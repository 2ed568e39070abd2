//! Test fixtures for the authentication service

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::domain::entities::user::User;
use crate::repositories::{
    InMemoryLoginAttemptRepository, InMemorySessionRepository, InMemoryTokenRepository,
    InMemoryUserProfileRepository, InMemoryUserRepository, InMemoryVerificationTokenRepository, UserRepository,
};
use crate::services::auth::{AuthService, AuthServiceConfig, LoginInput, RegisterInput, RequestContext};
use crate::services::password::PasswordService;
use crate::services::rate_limit::{InMemoryRateLimiter, RateLimitStatus, RateLimiterTrait};
use crate::services::token::{TokenService, TokenServiceConfig};
use crate::services::verification::{
    EmailMessage, EmailServiceTrait, VerificationService, VerificationServiceConfig,
};

pub const PASSWORD: &str = "Sombra#Segura2024";

/// Captures outgoing email
#[derive(Clone, Default)]
pub struct MockEmailService {
    pub sent: Arc<Mutex<Vec<EmailMessage>>>,
}

impl MockEmailService {
    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Code of the last email sent to `to`
    pub fn last_code_for(&self, to: &str) -> Option<String> {
        let sent = self.sent.lock().unwrap();
        sent.iter().rev().find(|m| m.to == to).and_then(|m| {
            m.body
                .split_whitespace()
                .find(|w| w.len() == 6 && w.chars().all(|c| c.is_ascii_digit()))
                .map(str::to_string)
        })
    }
}

#[async_trait]
impl EmailServiceTrait for MockEmailService {
    async fn send_email(&self, message: EmailMessage) -> Result<String, String> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(message);
        Ok(format!("mock-{}", sent.len()))
    }
}

/// Rate limiter whose backend is down
pub struct BrokenRateLimiter;

#[async_trait]
impl RateLimiterTrait for BrokenRateLimiter {
    async fn check_and_increment(&self, _: &str, _: u32, _: u64) -> Result<RateLimitStatus, String> {
        Err("connection refused".to_string())
    }

    async fn reset(&self, _: &str) -> Result<(), String> {
        Err("connection refused".to_string())
    }
}

pub struct Fixture {
    pub service: AuthService,
    pub users: InMemoryUserRepository,
    pub attempts: InMemoryLoginAttemptRepository,
    pub sessions: InMemorySessionRepository,
    pub profiles: InMemoryUserProfileRepository,
    pub tokens: InMemoryTokenRepository,
    pub email: MockEmailService,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with(AuthServiceConfig::default(), Arc::new(InMemoryRateLimiter::new()))
    }

    pub fn with(config: AuthServiceConfig, rate_limiter: Arc<dyn RateLimiterTrait>) -> Self {
        let users = InMemoryUserRepository::new();
        let attempts = InMemoryLoginAttemptRepository::new();
        let sessions = InMemorySessionRepository::new();
        let profiles = InMemoryUserProfileRepository::new();
        let tokens = InMemoryTokenRepository::new();
        let email = MockEmailService::default();

        let verification_service = Arc::new(VerificationService::new(
            Arc::new(InMemoryVerificationTokenRepository::new()),
            Arc::new(email.clone()),
            VerificationServiceConfig::default(),
        ));
        let token_service = Arc::new(TokenService::new(
            Arc::new(tokens.clone()),
            TokenServiceConfig::default(),
        ));

        let service = AuthService::new(
            Arc::new(users.clone()),
            Arc::new(attempts.clone()),
            Arc::new(sessions.clone()),
            Arc::new(profiles.clone()),
            verification_service,
            token_service,
            PasswordService::with_cost(4),
            rate_limiter,
            config,
        );

        Self {
            service,
            users,
            attempts,
            sessions,
            profiles,
            tokens,
            email,
        }
    }

    pub fn context() -> RequestContext {
        RequestContext::new(
            Some("203.0.113.7".to_string()),
            Some("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Safari/604.1".to_string()),
        )
    }

    pub fn register_input(email: &str, username: &str) -> RegisterInput {
        RegisterInput {
            email: email.to_string(),
            username: username.to_string(),
            password: PASSWORD.to_string(),
            password_confirm: PASSWORD.to_string(),
            first_name: "Carla".to_string(),
            last_name: "Mendes".to_string(),
            phone: None,
            company_name: None,
        }
    }

    pub fn login_input(email: &str) -> LoginInput {
        LoginInput {
            email: email.to_string(),
            password: PASSWORD.to_string(),
            verification_code: None,
        }
    }

    /// Registers and verifies a user
    pub async fn verified_user(&self, email: &str, username: &str) -> User {
        let user = self
            .service
            .register(Self::register_input(email, username), &Self::context())
            .await
            .unwrap();
        let code = self.email.last_code_for(&user.email).unwrap();
        self.service.verify_email(email, &code).await.unwrap();
        self.users.find_by_id(user.id).await.unwrap().unwrap()
    }
}
