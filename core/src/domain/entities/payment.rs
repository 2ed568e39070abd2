//! Local mirrors of payment gateway objects.
//!
//! The gateway is the source of truth; these records are updated from
//! client requests and webhook notifications.

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::user::SubscriptionPlan;

/// Length of one billing period
pub const BILLING_PERIOD_DAYS: i64 = 30;

/// A tokenized card stored at the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Card token or customer card id at the gateway
    pub provider_id: String,
    pub brand: String,
    pub last_four: String,
    pub exp_month: u32,
    pub exp_year: i32,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl PaymentMethod {
    pub fn new(
        user_id: Uuid,
        provider_id: String,
        brand: String,
        last_four: String,
        exp_month: u32,
        exp_year: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            provider_id,
            brand,
            last_four,
            exp_month,
            exp_year,
            is_default: false,
            created_at: Utc::now(),
        }
    }

    /// Cards are usable through the last day of their expiry month
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        (self.exp_year, self.exp_month) < (now.year(), now.month())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Pending,
    Active,
    Paused,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Pending => "pending",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Paused => "paused",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }

    /// Map a gateway preapproval status
    pub fn from_provider(status: &str) -> Option<Self> {
        match status {
            "pending" => Some(SubscriptionStatus::Pending),
            "authorized" | "active" => Some(SubscriptionStatus::Active),
            "paused" => Some(SubscriptionStatus::Paused),
            "cancelled" | "canceled" => Some(SubscriptionStatus::Cancelled),
            _ => None,
        }
    }
}

impl FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SubscriptionStatus::Pending),
            "active" => Ok(SubscriptionStatus::Active),
            "paused" => Ok(SubscriptionStatus::Paused),
            "cancelled" => Ok(SubscriptionStatus::Cancelled),
            other => Err(format!("Unknown subscription status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan: SubscriptionPlan,
    pub status: SubscriptionStatus,
    /// Preapproval id at the gateway
    pub provider_id: Option<String>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    pub fn new(user_id: Uuid, plan: SubscriptionPlan) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            plan,
            status: SubscriptionStatus::Pending,
            provider_id: None,
            current_period_end: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks the subscription active for one billing period from now
    pub fn activate(&mut self) {
        let now = Utc::now();
        self.status = SubscriptionStatus::Active;
        self.current_period_end = Some(now + Duration::days(BILLING_PERIOD_DAYS));
        self.updated_at = now;
    }

    pub fn set_status(&mut self, status: SubscriptionStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// Pending, active or paused subscriptions still count as current
    pub fn is_current(&self) -> bool {
        !matches!(self.status, SubscriptionStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    InProcess,
    Approved,
    Rejected,
    Cancelled,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::InProcess => "in_process",
            PaymentStatus::Approved => "approved",
            PaymentStatus::Rejected => "rejected",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Refunded => "refunded",
        }
    }

    /// Map a gateway payment status
    pub fn from_provider(status: &str) -> Option<Self> {
        match status {
            "pending" => Some(PaymentStatus::Pending),
            "in_process" | "in_mediation" | "authorized" => Some(PaymentStatus::InProcess),
            "approved" => Some(PaymentStatus::Approved),
            "rejected" => Some(PaymentStatus::Rejected),
            "cancelled" => Some(PaymentStatus::Cancelled),
            "refunded" | "charged_back" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }

    /// No further transitions are expected
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Approved
                | PaymentStatus::Rejected
                | PaymentStatus::Cancelled
                | PaymentStatus::Refunded
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "in_process" => Ok(PaymentStatus::InProcess),
            "approved" => Ok(PaymentStatus::Approved),
            "rejected" => Ok(PaymentStatus::Rejected),
            "cancelled" => Ok(PaymentStatus::Cancelled),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(format!("Unknown payment status: {}", other)),
        }
    }
}

/// A single charge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Amount in the smallest currency unit
    pub amount_cents: i64,
    pub currency: String,
    pub description: String,
    pub status: PaymentStatus,
    /// Subscription this charge pays for, if any
    pub subscription_id: Option<Uuid>,
    pub provider_payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentIntent {
    pub fn new(user_id: Uuid, amount_cents: i64, currency: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            amount_cents,
            currency,
            description,
            status: PaymentStatus::Pending,
            subscription_id: None,
            provider_payment_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn for_subscription(mut self, subscription_id: Uuid) -> Self {
        self.subscription_id = Some(subscription_id);
        self
    }

    pub fn set_status(&mut self, status: PaymentStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}
