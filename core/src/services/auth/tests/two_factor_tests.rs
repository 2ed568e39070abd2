//! Tests for the emailed second factor

use crate::domain::value_objects::{LoginOutcome, TwoFactorToggle};
use crate::errors::{AuthError, DomainError};
use crate::repositories::UserRepository;
use crate::services::auth::LoginInput;

use super::mocks::Fixture;

async fn enable_two_factor(fixture: &Fixture, email: &str, user_id: uuid::Uuid) {
    let outcome = fixture
        .service
        .toggle_two_factor(user_id, true, None)
        .await
        .unwrap();
    assert_eq!(outcome, TwoFactorToggle::VerificationRequired);

    let code = fixture.email.last_code_for(email).unwrap();
    let outcome = fixture
        .service
        .toggle_two_factor(user_id, true, Some(&code))
        .await
        .unwrap();
    assert_eq!(outcome, TwoFactorToggle::Updated { enabled: true });
}

#[tokio::test]
async fn test_enabling_requires_emailed_code() {
    let fixture = Fixture::new();
    let user = fixture.verified_user("carla@example.com", "carla").await;

    fixture.service.toggle_two_factor(user.id, true, None).await.unwrap();
    let err = fixture
        .service
        .toggle_two_factor(user.id, true, Some("not-it"))
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::Auth(AuthError::InvalidVerificationCode));
    assert!(!fixture.users.find_by_id(user.id).await.unwrap().unwrap().is_2fa_enabled);

    let code = fixture.email.last_code_for("carla@example.com").unwrap();
    fixture
        .service
        .toggle_two_factor(user.id, true, Some(&code))
        .await
        .unwrap();
    assert!(fixture.users.find_by_id(user.id).await.unwrap().unwrap().is_2fa_enabled);
}

#[tokio::test]
async fn test_disabling_is_immediate() {
    let fixture = Fixture::new();
    let user = fixture.verified_user("carla@example.com", "carla").await;
    enable_two_factor(&fixture, "carla@example.com", user.id).await;

    let outcome = fixture
        .service
        .toggle_two_factor(user.id, false, None)
        .await
        .unwrap();
    assert_eq!(outcome, TwoFactorToggle::Updated { enabled: false });
    assert!(!fixture.users.find_by_id(user.id).await.unwrap().unwrap().is_2fa_enabled);
}

#[tokio::test]
async fn test_login_with_second_factor() {
    let fixture = Fixture::new();
    let user = fixture.verified_user("carla@example.com", "carla").await;
    enable_two_factor(&fixture, "carla@example.com", user.id).await;
    let ctx = Fixture::context();

    let outcome = fixture
        .service
        .login(Fixture::login_input("carla@example.com"), &ctx)
        .await
        .unwrap();
    assert!(matches!(outcome, LoginOutcome::TwoFactorRequired));

    let wrong = LoginInput {
        verification_code: Some("000000x".to_string()),
        ..Fixture::login_input("carla@example.com")
    };
    let err = fixture.service.login(wrong, &ctx).await.unwrap_err();
    assert_eq!(err, DomainError::Auth(AuthError::InvalidVerificationCode));

    let code = fixture.email.last_code_for("carla@example.com").unwrap();
    let with_code = LoginInput {
        verification_code: Some(code),
        ..Fixture::login_input("carla@example.com")
    };
    let outcome = fixture.service.login(with_code, &ctx).await.unwrap();
    assert!(matches!(outcome, LoginOutcome::Authenticated(_)));
}

#[tokio::test]
async fn test_second_factor_prompt_is_not_a_failed_attempt() {
    let fixture = Fixture::new();
    let user = fixture.verified_user("carla@example.com", "carla").await;
    enable_two_factor(&fixture, "carla@example.com", user.id).await;
    let ctx = Fixture::context();

    fixture
        .service
        .login(Fixture::login_input("carla@example.com"), &ctx)
        .await
        .unwrap();
    let code = fixture.email.last_code_for("carla@example.com").unwrap();
    let with_code = LoginInput {
        verification_code: Some(code),
        ..Fixture::login_input("carla@example.com")
    };
    fixture.service.login(with_code, &ctx).await.unwrap();

    let log = fixture.service.security_log(user.id).await.unwrap();
    assert_eq!(log.len(), 1);
    assert!(log[0].success);

    let stats = fixture.service.stats(user.id).await.unwrap();
    assert_eq!(stats.total_login_attempts, 1);
}
