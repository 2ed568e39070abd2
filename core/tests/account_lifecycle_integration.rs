//! End-to-end flows across the core services using in-memory repositories

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use sb_core::domain::entities::user::SubscriptionPlan;
use sb_core::domain::value_objects::LoginOutcome;
use sb_core::errors::{DomainError, TokenError};
use sb_core::repositories::{
    InMemoryLoginAttemptRepository, InMemoryPaymentRepository, InMemorySessionRepository,
    InMemoryTokenRepository, InMemoryUserProfileRepository, InMemoryUserRepository,
    InMemoryVerificationTokenRepository, UserRepository,
};
use sb_core::services::auth::{AuthService, AuthServiceConfig, LoginInput, RegisterInput, RequestContext};
use sb_core::services::cleanup::{CleanupConfig, CleanupService};
use sb_core::services::password::PasswordService;
use sb_core::services::payment::{PaymentService, PaymentServiceConfig, WebhookEvent, WebhookOutcome};
use sb_core::services::rate_limit::InMemoryRateLimiter;
use sb_core::services::token::{TokenService, TokenServiceConfig};
use sb_core::services::verification::{
    EmailMessage, EmailServiceTrait, VerificationService, VerificationServiceConfig,
};

const PASSWORD: &str = "Sombra#Segura2024";

#[derive(Clone, Default)]
struct Outbox(Arc<Mutex<Vec<EmailMessage>>>);

impl Outbox {
    fn last_code(&self) -> String {
        let sent = self.0.lock().unwrap();
        let body = &sent.last().expect("no email sent").body;
        body.split_whitespace()
            .find(|w| w.len() == 6 && w.chars().all(|c| c.is_ascii_digit()))
            .expect("no code in email")
            .to_string()
    }
}

#[async_trait]
impl EmailServiceTrait for Outbox {
    async fn send_email(&self, message: EmailMessage) -> Result<String, String> {
        self.0.lock().unwrap().push(message);
        Ok("queued".to_string())
    }
}

struct App {
    auth: AuthService,
    payments: PaymentService,
    cleanup: CleanupService,
    users: InMemoryUserRepository,
    outbox: Outbox,
}

fn app() -> App {
    let users = InMemoryUserRepository::new();
    let tokens = InMemoryTokenRepository::new();
    let sessions = InMemorySessionRepository::new();
    let attempts = InMemoryLoginAttemptRepository::new();
    let codes = InMemoryVerificationTokenRepository::new();
    let outbox = Outbox::default();

    let verification = Arc::new(VerificationService::new(
        Arc::new(codes.clone()),
        Arc::new(outbox.clone()),
        VerificationServiceConfig::default(),
    ));
    let token_service = Arc::new(TokenService::new(Arc::new(tokens.clone()), TokenServiceConfig::default()));

    let auth = AuthService::new(
        Arc::new(users.clone()),
        Arc::new(attempts.clone()),
        Arc::new(sessions.clone()),
        Arc::new(InMemoryUserProfileRepository::new()),
        verification,
        token_service,
        PasswordService::with_cost(4),
        Arc::new(InMemoryRateLimiter::new()),
        AuthServiceConfig::default(),
    );
    let payments = PaymentService::new(
        Arc::new(InMemoryPaymentRepository::new()),
        Arc::new(users.clone()),
        PaymentServiceConfig::default(),
    );
    let cleanup = CleanupService::new(
        Arc::new(codes),
        Arc::new(tokens),
        Arc::new(sessions),
        Arc::new(attempts),
        CleanupConfig::default(),
    );

    App {
        auth,
        payments,
        cleanup,
        users,
        outbox,
    }
}

fn context() -> RequestContext {
    RequestContext::new(Some("198.51.100.20".to_string()), Some("Mozilla/5.0 (Windows NT 10.0)".to_string()))
}

#[tokio::test]
async fn test_register_verify_login_refresh_logout() {
    let app = app();
    let ctx = context();

    let user = app
        .auth
        .register(
            RegisterInput {
                email: "Joana@Sombreando.com".to_string(),
                username: "joana".to_string(),
                password: PASSWORD.to_string(),
                password_confirm: PASSWORD.to_string(),
                first_name: "Joana".to_string(),
                last_name: "Lima".to_string(),
                phone: None,
                company_name: Some("Sombras Ltda".to_string()),
            },
            &ctx,
        )
        .await
        .unwrap();
    assert_eq!(user.email, "joana@sombreando.com");
    assert!(!user.is_verified);

    let code = app.outbox.last_code();
    let verified = app.auth.verify_email("joana@sombreando.com", &code).await.unwrap();
    assert!(verified.is_verified);

    let login = LoginInput {
        email: "joana@sombreando.com".to_string(),
        password: PASSWORD.to_string(),
        verification_code: None,
    };
    let session = match app.auth.login(login, &ctx).await.unwrap() {
        LoginOutcome::Authenticated(response) => response,
        LoginOutcome::TwoFactorRequired => panic!("2FA is off"),
    };
    assert_eq!(session.token_type, "Bearer");

    let refreshed = app.auth.refresh(&session.refresh_token).await.unwrap();
    assert_ne!(refreshed.refresh_token, session.refresh_token);

    // the rotated-out token is now a reuse attempt
    let reuse = app.auth.refresh(&session.refresh_token).await;
    assert_eq!(reuse, Err(DomainError::Token(TokenError::TokenReuseDetected)));

    let stats = app.auth.stats(user.id).await.unwrap();
    assert!(stats.total_login_attempts >= 1);
}

#[tokio::test]
async fn test_paid_subscription_activated_by_webhook() {
    let app = app();
    let user = app
        .auth
        .register(
            RegisterInput {
                email: "pedro@sombreando.com".to_string(),
                username: "pedro".to_string(),
                password: PASSWORD.to_string(),
                password_confirm: PASSWORD.to_string(),
                first_name: "Pedro".to_string(),
                last_name: "Alves".to_string(),
                phone: None,
                company_name: None,
            },
            &context(),
        )
        .await
        .unwrap();

    let checkout = app.payments.subscribe(user.id, SubscriptionPlan::Premium).await.unwrap();
    let intent = checkout.payment_intent.expect("paid plans create an intent");

    let event: WebhookEvent = serde_json::from_value(serde_json::json!({
        "id": 9001,
        "type": "payment",
        "action": "payment.updated",
        "data": {
            "id": "123456789",
            "status": "approved",
            "external_reference": intent.id.to_string()
        }
    }))
    .unwrap();
    assert_eq!(app.payments.handle_webhook(event).await.unwrap(), WebhookOutcome::Processed);

    let user = app.users.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(user.subscription_plan, SubscriptionPlan::Premium);
    assert!(user.subscription_expires_at.unwrap() > Utc::now());

    let report = app.cleanup.run_once().await;
    assert!(report.is_success());
}
