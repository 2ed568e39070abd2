//! Read models for account pages.

use serde::{Deserialize, Serialize};

use crate::domain::entities::user::{SubscriptionPlan, User};
use crate::domain::entities::user_profile::UserProfile;

/// An account together with its extended profile
#[derive(Debug, Clone)]
pub struct AccountProfile {
    pub user: User,
    pub profile: UserProfile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub login_attempts_today: u64,
    pub total_login_attempts: u64,
    pub account_age_days: i64,
    pub is_verified: bool,
    pub is_2fa_enabled: bool,
    pub subscription_plan: SubscriptionPlan,
    pub is_subscription_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub available: bool,
    /// Alternatives, only filled for taken usernames
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub suggestions: Vec<String>,
}

impl Availability {
    pub fn available() -> Self {
        Self {
            available: true,
            suggestions: Vec::new(),
        }
    }

    pub fn taken(suggestions: Vec<String>) -> Self {
        Self {
            available: false,
            suggestions,
        }
    }
}
