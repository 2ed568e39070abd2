use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use sb_core::domain::entities::verification_token::{EmailVerificationToken, TokenPurpose};
use sb_core::errors::DomainError;
use sb_core::repositories::VerificationTokenRepository;

use crate::database::db_error;

const TOKEN_COLUMNS: &str =
    "id, user_id, code, purpose, attempts, is_used, used_at, created_at, expires_at";

pub struct PostgresVerificationTokenRepository {
    pool: PgPool,
}

impl PostgresVerificationTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_token(row: &PgRow) -> Result<EmailVerificationToken, DomainError> {
        let map = |e: sqlx::Error| DomainError::Internal {
            message: format!("Failed to read verification token row: {}", e),
        };
        let purpose: String = row.try_get("purpose").map_err(map)?;

        Ok(EmailVerificationToken {
            id: row.try_get("id").map_err(map)?,
            user_id: row.try_get("user_id").map_err(map)?,
            code: row.try_get("code").map_err(map)?,
            purpose: purpose
                .parse::<TokenPurpose>()
                .map_err(|message| DomainError::Internal { message })?,
            attempts: row.try_get("attempts").map_err(map)?,
            is_used: row.try_get("is_used").map_err(map)?,
            used_at: row.try_get("used_at").map_err(map)?,
            created_at: row.try_get("created_at").map_err(map)?,
            expires_at: row.try_get("expires_at").map_err(map)?,
        })
    }

    async fn find_latest_where(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
        only_unused: bool,
    ) -> Result<Option<EmailVerificationToken>, DomainError> {
        let query = format!(
            "SELECT {} FROM email_verification_tokens
             WHERE user_id = $1 AND purpose = $2 AND ($3 = FALSE OR is_used = FALSE)
             ORDER BY created_at DESC
             LIMIT 1",
            TOKEN_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(user_id)
            .bind(purpose.as_str())
            .bind(only_unused)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find verification token"))?;
        row.as_ref().map(Self::row_to_token).transpose()
    }
}

#[async_trait]
impl VerificationTokenRepository for PostgresVerificationTokenRepository {
    async fn create(&self, token: EmailVerificationToken) -> Result<EmailVerificationToken, DomainError> {
        let query = format!(
            "INSERT INTO email_verification_tokens ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            TOKEN_COLUMNS
        );

        sqlx::query(&query)
            .bind(token.id)
            .bind(token.user_id)
            .bind(&token.code)
            .bind(token.purpose.as_str())
            .bind(token.attempts)
            .bind(token.is_used)
            .bind(token.used_at)
            .bind(token.created_at)
            .bind(token.expires_at)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to save verification token"))?;

        Ok(token)
    }

    async fn find_latest_unused(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
    ) -> Result<Option<EmailVerificationToken>, DomainError> {
        self.find_latest_where(user_id, purpose, true).await
    }

    async fn find_latest(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
    ) -> Result<Option<EmailVerificationToken>, DomainError> {
        self.find_latest_where(user_id, purpose, false).await
    }

    async fn update(&self, token: EmailVerificationToken) -> Result<EmailVerificationToken, DomainError> {
        let result = sqlx::query(
            "UPDATE email_verification_tokens SET attempts = $2, is_used = $3, used_at = $4 WHERE id = $1",
        )
        .bind(token.id)
        .bind(token.attempts)
        .bind(token.is_used)
        .bind(token.used_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update verification token"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Verification token"));
        }
        Ok(token)
    }

    async fn delete_unused(&self, user_id: Uuid, purpose: TokenPurpose) -> Result<u64, DomainError> {
        let result = sqlx::query(
            "DELETE FROM email_verification_tokens WHERE user_id = $1 AND purpose = $2 AND is_used = FALSE",
        )
        .bind(user_id)
        .bind(purpose.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to delete verification tokens"))?;
        Ok(result.rows_affected())
    }

    async fn delete_expired(&self) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM email_verification_tokens WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete expired verification tokens"))?;
        Ok(result.rows_affected())
    }
}
