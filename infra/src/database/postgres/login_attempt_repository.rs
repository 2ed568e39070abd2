use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use sb_core::domain::entities::login_attempt::LoginAttempt;
use sb_core::errors::DomainError;
use sb_core::repositories::LoginAttemptRepository;

use crate::database::db_error;

pub struct PostgresLoginAttemptRepository {
    pool: PgPool,
}

impl PostgresLoginAttemptRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_attempt(row: &PgRow) -> Result<LoginAttempt, DomainError> {
        let map = |e: sqlx::Error| DomainError::Internal {
            message: format!("Failed to read login attempt row: {}", e),
        };

        Ok(LoginAttempt {
            id: row.try_get("id").map_err(map)?,
            email: row.try_get("email").map_err(map)?,
            ip_address: row.try_get("ip_address").map_err(map)?,
            user_agent: row.try_get("user_agent").map_err(map)?,
            success: row.try_get("success").map_err(map)?,
            failure_reason: row.try_get("failure_reason").map_err(map)?,
            timestamp: row.try_get("attempted_at").map_err(map)?,
            country: row.try_get("country").map_err(map)?,
            city: row.try_get("city").map_err(map)?,
        })
    }
}

#[async_trait]
impl LoginAttemptRepository for PostgresLoginAttemptRepository {
    async fn create(&self, attempt: LoginAttempt) -> Result<LoginAttempt, DomainError> {
        let query = r#"
            INSERT INTO login_attempts (
                id, email, ip_address, user_agent, success, failure_reason,
                attempted_at, country, city
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#;

        sqlx::query(query)
            .bind(attempt.id)
            .bind(&attempt.email)
            .bind(&attempt.ip_address)
            .bind(&attempt.user_agent)
            .bind(attempt.success)
            .bind(&attempt.failure_reason)
            .bind(attempt.timestamp)
            .bind(&attempt.country)
            .bind(&attempt.city)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to record login attempt"))?;

        Ok(attempt)
    }

    async fn recent_for_email(&self, email: &str, limit: usize) -> Result<Vec<LoginAttempt>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, email, ip_address, user_agent, success, failure_reason,
                   attempted_at, country, city
            FROM login_attempts
            WHERE email = $1
            ORDER BY attempted_at DESC
            LIMIT $2
            "#,
        )
        .bind(email)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load login attempts"))?;

        rows.iter().map(Self::row_to_attempt).collect()
    }

    async fn count_for_email(
        &self,
        email: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<u64, DomainError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM login_attempts WHERE email = $1 AND ($2::timestamptz IS NULL OR attempted_at >= $2)",
        )
        .bind(email)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count login attempts"))?;
        Ok(count as u64)
    }

    async fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM login_attempts WHERE attempted_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete login attempts"))?;
        Ok(result.rows_affected())
    }
}
