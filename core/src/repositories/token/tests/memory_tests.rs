//! Unit tests for the in-memory token repository

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::token::RefreshToken;
use crate::repositories::token::{InMemoryTokenRepository, TokenRepository};

fn token(user_id: Uuid, hash: &str) -> RefreshToken {
    RefreshToken::new(user_id, Uuid::new_v4(), hash.to_string(), Duration::days(7))
}

#[tokio::test]
async fn test_save_and_find_refresh_token() {
    let repo = InMemoryTokenRepository::new();
    let user_id = Uuid::new_v4();
    let saved = repo.save_refresh_token(token(user_id, "test_hash")).await.unwrap();

    let found = repo.find_refresh_token("test_hash").await.unwrap().unwrap();
    assert_eq!(found.id, saved.id);
    assert!(repo.find_refresh_token("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_token() {
    let repo = InMemoryTokenRepository::new();
    let user_id = Uuid::new_v4();
    repo.save_refresh_token(token(user_id, "dup")).await.unwrap();
    assert!(repo.save_refresh_token(token(user_id, "dup")).await.is_err());
}

#[tokio::test]
async fn test_revoke_family_only_touches_family() {
    let repo = InMemoryTokenRepository::new();
    let user_id = Uuid::new_v4();
    let first = repo.save_refresh_token(token(user_id, "a")).await.unwrap();
    let sibling = RefreshToken::in_family(
        user_id,
        first.session_id,
        "b".to_string(),
        first.token_family,
        Duration::days(7),
    );
    repo.save_refresh_token(sibling).await.unwrap();
    repo.save_refresh_token(token(user_id, "other")).await.unwrap();

    assert_eq!(repo.revoke_family(first.token_family).await.unwrap(), 2);
    assert_eq!(repo.count_active_tokens(user_id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_revoke_all_user_tokens() {
    let repo = InMemoryTokenRepository::new();
    let user_id = Uuid::new_v4();
    repo.save_refresh_token(token(user_id, "a")).await.unwrap();
    repo.save_refresh_token(token(user_id, "b")).await.unwrap();
    repo.save_refresh_token(token(Uuid::new_v4(), "c")).await.unwrap();

    assert_eq!(repo.revoke_all_user_tokens(user_id).await.unwrap(), 2);
    // already revoked tokens are not counted twice
    assert_eq!(repo.revoke_all_user_tokens(user_id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_blacklist_and_cleanup() {
    let repo = InMemoryTokenRepository::new();
    repo.blacklist_jti("live", Utc::now() + Duration::minutes(5)).await.unwrap();
    repo.blacklist_jti("old", Utc::now() - Duration::minutes(5)).await.unwrap();
    repo.save_refresh_token(RefreshToken::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        "expired".to_string(),
        Duration::seconds(-1),
    ))
    .await
    .unwrap();

    assert!(repo.is_jti_blacklisted("live").await.unwrap());
    assert_eq!(repo.delete_expired().await.unwrap(), 2);
    assert!(repo.is_jti_blacklisted("live").await.unwrap());
    assert!(!repo.is_jti_blacklisted("old").await.unwrap());
    assert!(repo.find_refresh_token("expired").await.unwrap().is_none());
}
