//! Active login sessions, one per successful login.

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sb_shared::utils::DeviceInfo;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sessions idle longer than this are considered expired
pub const SESSION_IDLE_DAYS: i64 = 30;

const SESSION_KEY_LENGTH: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Random opaque key
    #[serde(skip_serializing)]
    pub session_key: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub device_info: DeviceInfo,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub is_active: bool,
}

impl UserSession {
    pub fn new(
        user_id: Uuid,
        ip_address: Option<String>,
        user_agent: Option<String>,
        device_info: DeviceInfo,
    ) -> Self {
        let now = Utc::now();
        let session_key = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SESSION_KEY_LENGTH)
            .map(char::from)
            .collect();

        Self {
            id: Uuid::new_v4(),
            user_id,
            session_key,
            ip_address,
            user_agent,
            device_info,
            created_at: now,
            last_activity: now,
            is_active: true,
        }
    }

    /// True when the session saw no activity for 30 days
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.last_activity + Duration::days(SESSION_IDLE_DAYS)
    }

    pub fn is_usable(&self) -> bool {
        self.is_active && !self.is_expired()
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}
