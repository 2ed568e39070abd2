//! User entity representing a registered Sombreando account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Subscription tier of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlan {
    #[default]
    Free,
    Basic,
    Premium,
    Enterprise,
}

impl SubscriptionPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionPlan::Free => "free",
            SubscriptionPlan::Basic => "basic",
            SubscriptionPlan::Premium => "premium",
            SubscriptionPlan::Enterprise => "enterprise",
        }
    }

    /// Monthly price in BRL cents
    pub fn monthly_price_cents(&self) -> i64 {
        match self {
            SubscriptionPlan::Free => 0,
            SubscriptionPlan::Basic => 2_990,
            SubscriptionPlan::Premium => 5_990,
            SubscriptionPlan::Enterprise => 14_990,
        }
    }

    pub fn is_paid(&self) -> bool {
        !matches!(self, SubscriptionPlan::Free)
    }
}

impl fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionPlan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(SubscriptionPlan::Free),
            "basic" => Ok(SubscriptionPlan::Basic),
            "premium" => Ok(SubscriptionPlan::Premium),
            "enterprise" => Ok(SubscriptionPlan::Enterprise),
            other => Err(format!("Unknown subscription plan: {}", other)),
        }
    }
}

/// Editable profile fields; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
}

/// User entity representing a registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Login email, stored lowercased
    pub email: String,

    /// Public handle, stored lowercased
    pub username: String,

    /// bcrypt hash of the password
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub company_name: Option<String>,

    /// Whether the email address has been confirmed
    pub is_verified: bool,

    /// Whether login requires an emailed code
    pub is_2fa_enabled: bool,

    /// False once the account is deactivated or deleted
    pub is_active: bool,

    pub subscription_plan: SubscriptionPlan,
    pub subscription_expires_at: Option<DateTime<Utc>>,

    pub last_login_ip: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates an unverified, active user on the free plan
    pub fn new(
        email: String,
        username: String,
        password_hash: String,
        first_name: String,
        last_name: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            username,
            password_hash,
            first_name,
            last_name,
            phone: None,
            company_name: None,
            is_verified: false,
            is_2fa_enabled: false,
            is_active: true,
            subscription_plan: SubscriptionPlan::Free,
            subscription_expires_at: None,
            last_login_ip: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// Free accounts are always active; paid plans until they lapse
    pub fn is_subscription_active(&self) -> bool {
        if self.subscription_plan == SubscriptionPlan::Free {
            return true;
        }
        self.subscription_expires_at
            .map(|expires_at| expires_at > Utc::now())
            .unwrap_or(false)
    }

    /// Marks the email as verified
    pub fn verify_email(&mut self) {
        self.is_verified = true;
        self.updated_at = Utc::now();
    }

    pub fn set_two_factor(&mut self, enabled: bool) {
        self.is_2fa_enabled = enabled;
        self.updated_at = Utc::now();
    }

    pub fn set_password_hash(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.updated_at = Utc::now();
    }

    /// Records a successful login from `ip`
    pub fn record_login(&mut self, ip: Option<String>) {
        let now = Utc::now();
        self.last_login_ip = ip;
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    pub fn update_profile(&mut self, update: ProfileUpdate) {
        if let Some(first_name) = update.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            self.last_name = last_name;
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone).filter(|p| !p.is_empty());
        }
        if let Some(company_name) = update.company_name {
            self.company_name = Some(company_name).filter(|c| !c.is_empty());
        }
        self.updated_at = Utc::now();
    }

    /// Moves the account to `plan` until `until`
    pub fn activate_plan(&mut self, plan: SubscriptionPlan, until: Option<DateTime<Utc>>) {
        self.subscription_plan = plan;
        self.subscription_expires_at = until;
        self.updated_at = Utc::now();
    }

    /// Deactivates the account and frees its email and username
    pub fn soft_delete(&mut self) {
        self.is_active = false;
        self.email = format!("deleted_{}@sombreando.com", self.id);
        self.username = format!("deleted_{}", self.id);
        self.is_2fa_enabled = false;
        self.updated_at = Utc::now();
    }
}
