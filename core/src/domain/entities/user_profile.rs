//! Extended profile and preferences, one per user, created on registration.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";
pub const MAX_BIO_LENGTH: usize = 500;
pub const MAX_LOCATION_LENGTH: usize = 100;
pub const MAX_WEBSITE_LENGTH: usize = 200;
pub const MAX_TIMEZONE_LENGTH: usize = 50;

/// Preferred interface language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProfileLanguage {
    #[default]
    #[serde(rename = "pt-br")]
    PtBr,
    #[serde(rename = "en")]
    En,
    #[serde(rename = "es")]
    Es,
}

impl ProfileLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileLanguage::PtBr => "pt-br",
            ProfileLanguage::En => "en",
            ProfileLanguage::Es => "es",
        }
    }
}

impl FromStr for ProfileLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pt-br" => Ok(ProfileLanguage::PtBr),
            "en" => Ok(ProfileLanguage::En),
            "es" => Ok(ProfileLanguage::Es),
            other => Err(format!("Unknown language: {}", other)),
        }
    }
}

impl fmt::Display for ProfileLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who may see the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileVisibility {
    #[default]
    Public,
    Private,
    Friends,
}

impl ProfileVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileVisibility::Public => "public",
            ProfileVisibility::Private => "private",
            ProfileVisibility::Friends => "friends",
        }
    }
}

impl FromStr for ProfileVisibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(ProfileVisibility::Public),
            "private" => Ok(ProfileVisibility::Private),
            "friends" => Ok(ProfileVisibility::Friends),
            other => Err(format!("Unknown profile visibility: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub bio: String,
    pub location: String,
    pub website: String,
    pub birth_date: Option<NaiveDate>,
    pub language: ProfileLanguage,
    pub timezone: String,
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub marketing_emails: bool,
    pub profile_visibility: ProfileVisibility,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub updated_at: DateTime<Utc>,
}

/// Editable profile fields; `None` leaves the field untouched.
/// `birth_date: Some(None)` clears the date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfileUpdate {
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub birth_date: Option<Option<NaiveDate>>,
    pub language: Option<ProfileLanguage>,
    pub timezone: Option<String>,
    pub email_notifications: Option<bool>,
    pub push_notifications: Option<bool>,
    pub marketing_emails: Option<bool>,
    pub profile_visibility: Option<ProfileVisibility>,
}

impl UserProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl UserProfile {
    /// Defaults: pt-BR, São Paulo time, product notifications on, marketing off
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            bio: String::new(),
            location: String::new(),
            website: String::new(),
            birth_date: None,
            language: ProfileLanguage::default(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            email_notifications: true,
            push_notifications: true,
            marketing_emails: false,
            profile_visibility: ProfileVisibility::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, update: UserProfileUpdate) {
        if let Some(bio) = update.bio {
            self.bio = bio;
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        if let Some(website) = update.website {
            self.website = website;
        }
        if let Some(birth_date) = update.birth_date {
            self.birth_date = birth_date;
        }
        if let Some(language) = update.language {
            self.language = language;
        }
        if let Some(timezone) = update.timezone {
            self.timezone = timezone;
        }
        if let Some(email_notifications) = update.email_notifications {
            self.email_notifications = email_notifications;
        }
        if let Some(push_notifications) = update.push_notifications {
            self.push_notifications = push_notifications;
        }
        if let Some(marketing_emails) = update.marketing_emails {
            self.marketing_emails = marketing_emails;
        }
        if let Some(profile_visibility) = update.profile_visibility {
            self.profile_visibility = profile_visibility;
        }
        self.updated_at = Utc::now();
    }
}
