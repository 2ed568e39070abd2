//! PostgreSQL implementation of the UserRepository trait.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use sb_core::domain::entities::user::{SubscriptionPlan, User};
use sb_core::errors::{AuthError, DomainError};
use sb_core::repositories::UserRepository;

use crate::database::{db_error, is_unique_violation};

const USER_COLUMNS: &str = r#"
    id, email, username, password_hash, first_name, last_name, phone, company_name,
    is_verified, is_2fa_enabled, is_active, subscription_plan, subscription_expires_at,
    last_login_ip, last_login_at, created_at, updated_at
"#;

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &PgRow) -> Result<User, DomainError> {
        let map = |e: sqlx::Error| DomainError::Internal {
            message: format!("Failed to read user row: {}", e),
        };
        let plan: String = row.try_get("subscription_plan").map_err(map)?;

        Ok(User {
            id: row.try_get("id").map_err(map)?,
            email: row.try_get("email").map_err(map)?,
            username: row.try_get("username").map_err(map)?,
            password_hash: row.try_get("password_hash").map_err(map)?,
            first_name: row.try_get("first_name").map_err(map)?,
            last_name: row.try_get("last_name").map_err(map)?,
            phone: row.try_get("phone").map_err(map)?,
            company_name: row.try_get("company_name").map_err(map)?,
            is_verified: row.try_get("is_verified").map_err(map)?,
            is_2fa_enabled: row.try_get("is_2fa_enabled").map_err(map)?,
            is_active: row.try_get("is_active").map_err(map)?,
            subscription_plan: plan
                .parse::<SubscriptionPlan>()
                .map_err(|message| DomainError::Internal { message })?,
            subscription_expires_at: row.try_get("subscription_expires_at").map_err(map)?,
            last_login_ip: row.try_get("last_login_ip").map_err(map)?,
            last_login_at: row.try_get("last_login_at").map_err(map)?,
            created_at: row.try_get("created_at").map_err(map)?,
            updated_at: row.try_get("updated_at").map_err(map)?,
        })
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<User>, DomainError> {
        let query = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, column);
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user"))?;
        row.as_ref().map(Self::row_to_user).transpose()
    }

    /// Map a unique violation to the field that clashed
    fn conflict_error(error: sqlx::Error) -> DomainError {
        if is_unique_violation(&error) {
            if let sqlx::Error::Database(db) = &error {
                if db.constraint().is_some_and(|c| c.contains("username")) {
                    return AuthError::UsernameAlreadyExists.into();
                }
            }
            return AuthError::EmailAlreadyExists.into();
        }
        DomainError::Internal {
            message: format!("Failed to save user: {}", error),
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by id"))?;
        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.find_one("email", email).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        self.find_one("username", username).await
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let query = format!(
            "INSERT INTO users ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
            USER_COLUMNS
        );

        sqlx::query(&query)
            .bind(user.id)
            .bind(&user.email)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.phone)
            .bind(&user.company_name)
            .bind(user.is_verified)
            .bind(user.is_2fa_enabled)
            .bind(user.is_active)
            .bind(user.subscription_plan.as_str())
            .bind(user.subscription_expires_at)
            .bind(&user.last_login_ip)
            .bind(user.last_login_at)
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(&self.pool)
            .await
            .map_err(Self::conflict_error)?;

        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, DomainError> {
        let query = r#"
            UPDATE users SET
                email = $2, username = $3, password_hash = $4, first_name = $5, last_name = $6,
                phone = $7, company_name = $8, is_verified = $9, is_2fa_enabled = $10,
                is_active = $11, subscription_plan = $12, subscription_expires_at = $13,
                last_login_ip = $14, last_login_at = $15, updated_at = $16
            WHERE id = $1
        "#;

        let result = sqlx::query(query)
            .bind(user.id)
            .bind(&user.email)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.phone)
            .bind(&user.company_name)
            .bind(user.is_verified)
            .bind(user.is_2fa_enabled)
            .bind(user.is_active)
            .bind(user.subscription_plan.as_str())
            .bind(user.subscription_expires_at)
            .bind(&user.last_login_ip)
            .bind(user.last_login_at)
            .bind(user.updated_at)
            .execute(&self.pool)
            .await
            .map_err(Self::conflict_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("User"));
        }
        Ok(user)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to check email"))
    }

    async fn username_exists(&self, username: &str) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to check username"))
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count users"))?;
        Ok(count as u64)
    }
}
