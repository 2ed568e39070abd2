//! PostgreSQL implementation of the TokenRepository trait.
//!
//! Refresh tokens arrive already hashed; the raw value never reaches the
//! database. Revoked rows stay until they expire so reuse can be detected.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use sb_core::domain::entities::token::RefreshToken;
use sb_core::errors::DomainError;
use sb_core::repositories::TokenRepository;

use crate::database::{db_error, is_unique_violation};

pub struct PostgresTokenRepository {
    pool: PgPool,
}

impl PostgresTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_token(row: &PgRow) -> Result<RefreshToken, DomainError> {
        let map = |e: sqlx::Error| DomainError::Internal {
            message: format!("Failed to read refresh token row: {}", e),
        };

        Ok(RefreshToken {
            id: row.try_get("id").map_err(map)?,
            user_id: row.try_get("user_id").map_err(map)?,
            session_id: row.try_get("session_id").map_err(map)?,
            token_hash: row.try_get("token_hash").map_err(map)?,
            token_family: row.try_get("token_family").map_err(map)?,
            created_at: row.try_get("created_at").map_err(map)?,
            expires_at: row.try_get("expires_at").map_err(map)?,
            is_revoked: row.try_get("is_revoked").map_err(map)?,
            revoked_at: row.try_get("revoked_at").map_err(map)?,
        })
    }
}

#[async_trait]
impl TokenRepository for PostgresTokenRepository {
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        let query = r#"
            INSERT INTO refresh_tokens (
                id, user_id, session_id, token_hash, token_family,
                created_at, expires_at, is_revoked, revoked_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#;

        sqlx::query(query)
            .bind(token.id)
            .bind(token.user_id)
            .bind(token.session_id)
            .bind(&token.token_hash)
            .bind(token.token_family)
            .bind(token.created_at)
            .bind(token.expires_at)
            .bind(token.is_revoked)
            .bind(token.revoked_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::BusinessRule {
                        message: "Token already exists".to_string(),
                    }
                } else {
                    DomainError::Internal {
                        message: format!("Failed to save refresh token: {}", e),
                    }
                }
            })?;

        Ok(token)
    }

    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        let query = r#"
            SELECT id, user_id, session_id, token_hash, token_family,
                   created_at, expires_at, is_revoked, revoked_at
            FROM refresh_tokens
            WHERE token_hash = $1
        "#;

        let row = sqlx::query(query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find refresh token"))?;
        row.as_ref().map(Self::row_to_token).transpose()
    }

    async fn revoke_token(&self, token_id: Uuid) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET is_revoked = TRUE, revoked_at = COALESCE(revoked_at, NOW()) WHERE id = $1",
        )
        .bind(token_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to revoke token"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Refresh token"));
        }
        Ok(())
    }

    async fn revoke_family(&self, token_family: Uuid) -> Result<u64, DomainError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET is_revoked = TRUE, revoked_at = NOW() WHERE token_family = $1 AND is_revoked = FALSE",
        )
        .bind(token_family)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to revoke token family"))?;
        Ok(result.rows_affected())
    }

    async fn revoke_all_user_tokens(&self, user_id: Uuid) -> Result<u64, DomainError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET is_revoked = TRUE, revoked_at = NOW() WHERE user_id = $1 AND is_revoked = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to revoke user tokens"))?;
        Ok(result.rows_affected())
    }

    async fn revoke_session_tokens(&self, session_id: Uuid) -> Result<u64, DomainError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET is_revoked = TRUE, revoked_at = NOW() WHERE session_id = $1 AND is_revoked = FALSE",
        )
        .bind(session_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to revoke session tokens"))?;
        Ok(result.rows_affected())
    }

    async fn blacklist_jti(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO token_blacklist (jti, expires_at) VALUES ($1, $2) ON CONFLICT (jti) DO NOTHING",
        )
        .bind(jti)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to blacklist token"))?;
        Ok(())
    }

    async fn is_jti_blacklisted(&self, jti: &str) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM token_blacklist WHERE jti = $1 AND expires_at > NOW())",
        )
        .bind(jti)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to check blacklist"))
    }

    async fn delete_expired(&self) -> Result<u64, DomainError> {
        let tokens = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete expired tokens"))?;
        let blacklist = sqlx::query("DELETE FROM token_blacklist WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to clean blacklist"))?;
        Ok(tokens.rows_affected() + blacklist.rows_affected())
    }

    async fn count_active_tokens(&self, user_id: Uuid) -> Result<u64, DomainError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM refresh_tokens WHERE user_id = $1 AND is_revoked = FALSE AND expires_at > NOW()",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count tokens"))?;
        Ok(count as u64)
    }
}
