use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use sb_core::domain::entities::user_profile::{ProfileLanguage, ProfileVisibility, UserProfile};
use sb_core::errors::DomainError;
use sb_core::repositories::UserProfileRepository;

use crate::database::db_error;

const PROFILE_COLUMNS: &str = "user_id, bio, location, website, birth_date, language, timezone, \
    email_notifications, push_notifications, marketing_emails, profile_visibility, created_at, updated_at";

pub struct PostgresUserProfileRepository {
    pool: PgPool,
}

impl PostgresUserProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_profile(row: &PgRow) -> Result<UserProfile, DomainError> {
        let map = |e: sqlx::Error| DomainError::Internal {
            message: format!("Failed to read profile row: {}", e),
        };
        let language: String = row.try_get("language").map_err(map)?;
        let visibility: String = row.try_get("profile_visibility").map_err(map)?;

        Ok(UserProfile {
            user_id: row.try_get("user_id").map_err(map)?,
            bio: row.try_get("bio").map_err(map)?,
            location: row.try_get("location").map_err(map)?,
            website: row.try_get("website").map_err(map)?,
            birth_date: row.try_get("birth_date").map_err(map)?,
            language: language
                .parse::<ProfileLanguage>()
                .map_err(|message| DomainError::Internal { message })?,
            timezone: row.try_get("timezone").map_err(map)?,
            email_notifications: row.try_get("email_notifications").map_err(map)?,
            push_notifications: row.try_get("push_notifications").map_err(map)?,
            marketing_emails: row.try_get("marketing_emails").map_err(map)?,
            profile_visibility: visibility
                .parse::<ProfileVisibility>()
                .map_err(|message| DomainError::Internal { message })?,
            created_at: row.try_get("created_at").map_err(map)?,
            updated_at: row.try_get("updated_at").map_err(map)?,
        })
    }
}

#[async_trait]
impl UserProfileRepository for PostgresUserProfileRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<UserProfile>, DomainError> {
        let query = format!("SELECT {} FROM user_profiles WHERE user_id = $1", PROFILE_COLUMNS);
        let row = sqlx::query(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find profile"))?;
        row.as_ref().map(Self::row_to_profile).transpose()
    }

    async fn save(&self, profile: UserProfile) -> Result<UserProfile, DomainError> {
        let query = format!(
            "INSERT INTO user_profiles ({}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             ON CONFLICT (user_id) DO UPDATE SET \
                bio = EXCLUDED.bio, location = EXCLUDED.location, website = EXCLUDED.website, \
                birth_date = EXCLUDED.birth_date, language = EXCLUDED.language, \
                timezone = EXCLUDED.timezone, email_notifications = EXCLUDED.email_notifications, \
                push_notifications = EXCLUDED.push_notifications, \
                marketing_emails = EXCLUDED.marketing_emails, \
                profile_visibility = EXCLUDED.profile_visibility, updated_at = EXCLUDED.updated_at",
            PROFILE_COLUMNS
        );

        sqlx::query(&query)
            .bind(profile.user_id)
            .bind(&profile.bio)
            .bind(&profile.location)
            .bind(&profile.website)
            .bind(profile.birth_date)
            .bind(profile.language.as_str())
            .bind(&profile.timezone)
            .bind(profile.email_notifications)
            .bind(profile.push_notifications)
            .bind(profile.marketing_emails)
            .bind(profile.profile_visibility.as_str())
            .bind(profile.created_at)
            .bind(profile.updated_at)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to save profile"))?;

        Ok(profile)
    }
}
