//! Shared setup for the HTTP integration tests

#![allow(dead_code, unused_macros)]

use std::sync::Arc;

use actix_web::{http::header, test, web};
use serde_json::{json, Value};

use sb_api::{AppState, Repositories};
use sb_core::services::{HealthProbe, InMemoryRateLimiter, PasswordService, StaticProbe};
use sb_infra::email::MockEmailService;
use sb_shared::{AppConfig, Environment, RateLimitConfig};

pub const PASSWORD: &str = "Sombra#Segura2024";
pub const WEBHOOK_SECRET: &str = "test-webhook-secret";

pub struct TestContext {
    pub state: web::Data<AppState>,
    pub email: MockEmailService,
    pub repositories: Repositories,
}

impl TestContext {
    /// Latest six-digit code emailed to `email`
    pub fn code_for(&self, email: &str) -> String {
        self.email
            .last_code_for(email)
            .unwrap_or_else(|| panic!("no code emailed to {}", email))
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.environment = Environment::Test;
    config.rate_limit = RateLimitConfig::disabled();
    config.payment.webhook_secret = WEBHOOK_SECRET.to_string();
    config
}

pub fn context() -> TestContext {
    context_with(test_config())
}

pub fn context_with(config: AppConfig) -> TestContext {
    let repositories = Repositories::in_memory();
    let email = MockEmailService::new();
    let probes: Vec<Arc<dyn HealthProbe>> = vec![Arc::new(StaticProbe::new("database"))];

    let state = AppState::build_with_password_service(
        config,
        &repositories,
        Arc::new(email.clone()),
        Arc::new(InMemoryRateLimiter::new()),
        probes,
        PasswordService::with_cost(4),
    );

    TestContext {
        state: web::Data::new(state),
        email,
        repositories,
    }
}

pub fn post_json(uri: &str, body: Value) -> test::TestRequest {
    test::TestRequest::post().uri(uri).set_json(body)
}

pub fn bearer(req: test::TestRequest, token: &str) -> test::TestRequest {
    req.insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
}

pub fn registration(email: &str, username: &str) -> Value {
    json!({
        "email": email,
        "username": username,
        "password": PASSWORD,
        "password_confirm": PASSWORD,
        "first_name": "Ana",
        "last_name": "Souza",
    })
}

pub fn credentials(email: &str) -> Value {
    json!({ "email": email, "password": PASSWORD })
}

/// Build the app under test from a [`TestContext`]
macro_rules! init_app {
    ($ctx:expr) => {
        actix_web::test::init_service(sb_api::create_app($ctx.state.clone())).await
    };
}

/// Call the app and decode the JSON body, returning `(status, body)`
macro_rules! call_json {
    ($app:expr, $req:expr) => {{
        let resp = actix_web::test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let bytes = actix_web::test::read_body(resp).await;
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }};
}

/// Register and verify an account
macro_rules! register_verified {
    ($app:expr, $ctx:expr, $email:expr, $username:expr) => {{
        let (status, _) = call_json!(
            $app,
            common::post_json("/api/v1/auth/register/", common::registration($email, $username))
        );
        assert_eq!(status, actix_web::http::StatusCode::CREATED);

        let code = $ctx.code_for($email);
        let (status, _) = call_json!(
            $app,
            common::post_json(
                "/api/v1/auth/email/verify/",
                serde_json::json!({ "email": $email, "code": code })
            )
        );
        assert_eq!(status, actix_web::http::StatusCode::OK);
    }};
}

/// Register, verify and log in; evaluates to the login response body
macro_rules! signed_in {
    ($app:expr, $ctx:expr, $email:expr, $username:expr) => {{
        register_verified!($app, $ctx, $email, $username);
        let (status, body) = call_json!(
            $app,
            common::post_json("/api/v1/auth/login/", common::credentials($email))
        );
        assert_eq!(status, actix_web::http::StatusCode::OK);
        body
    }};
}
