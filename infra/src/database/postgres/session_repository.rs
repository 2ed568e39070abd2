use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sb_shared::utils::DeviceInfo;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use sb_core::domain::entities::session::UserSession;
use sb_core::errors::DomainError;
use sb_core::repositories::SessionRepository;

use crate::database::db_error;

const SESSION_COLUMNS: &str =
    "id, user_id, session_key, ip_address, user_agent, device_info, created_at, last_activity, is_active";

pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_session(row: &PgRow) -> Result<UserSession, DomainError> {
        let map = |e: sqlx::Error| DomainError::Internal {
            message: format!("Failed to read session row: {}", e),
        };
        let Json(device_info): Json<DeviceInfo> = row.try_get("device_info").map_err(map)?;

        Ok(UserSession {
            id: row.try_get("id").map_err(map)?,
            user_id: row.try_get("user_id").map_err(map)?,
            session_key: row.try_get("session_key").map_err(map)?,
            ip_address: row.try_get("ip_address").map_err(map)?,
            user_agent: row.try_get("user_agent").map_err(map)?,
            device_info,
            created_at: row.try_get("created_at").map_err(map)?,
            last_activity: row.try_get("last_activity").map_err(map)?,
            is_active: row.try_get("is_active").map_err(map)?,
        })
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn create(&self, session: UserSession) -> Result<UserSession, DomainError> {
        let query = format!(
            "INSERT INTO user_sessions ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            SESSION_COLUMNS
        );

        sqlx::query(&query)
            .bind(session.id)
            .bind(session.user_id)
            .bind(&session.session_key)
            .bind(&session.ip_address)
            .bind(&session.user_agent)
            .bind(Json(&session.device_info))
            .bind(session.created_at)
            .bind(session.last_activity)
            .bind(session.is_active)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to create session"))?;

        Ok(session)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserSession>, DomainError> {
        let query = format!("SELECT {} FROM user_sessions WHERE id = $1", SESSION_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find session"))?;
        row.as_ref().map(Self::row_to_session).transpose()
    }

    async fn list_active(&self, user_id: Uuid) -> Result<Vec<UserSession>, DomainError> {
        let query = format!(
            "SELECT {} FROM user_sessions WHERE user_id = $1 AND is_active = TRUE ORDER BY last_activity DESC",
            SESSION_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list sessions"))?;
        rows.iter().map(Self::row_to_session).collect()
    }

    async fn update(&self, session: UserSession) -> Result<UserSession, DomainError> {
        let result = sqlx::query(
            "UPDATE user_sessions SET last_activity = $2, is_active = $3, ip_address = $4 WHERE id = $1",
        )
        .bind(session.id)
        .bind(session.last_activity)
        .bind(session.is_active)
        .bind(&session.ip_address)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update session"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Session"));
        }
        Ok(session)
    }

    async fn deactivate_all(&self, user_id: Uuid) -> Result<u64, DomainError> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_active = FALSE WHERE user_id = $1 AND is_active = TRUE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to deactivate sessions"))?;
        Ok(result.rows_affected())
    }

    async fn deactivate_stale(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_active = FALSE WHERE is_active = TRUE AND last_activity < $1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to deactivate stale sessions"))?;
        Ok(result.rows_affected())
    }
}
