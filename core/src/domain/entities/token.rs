//! Token entities for JWT-based authentication.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access token expiration time (60 minutes)
pub const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 60;

/// Refresh token expiration time (7 days)
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 7;

/// JWT issuer
pub const JWT_ISSUER: &str = "sombreando";

/// JWT audience
pub const JWT_AUDIENCE: &str = "sombreando-app";

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// JWT ID, used for blacklisting on logout
    pub jti: String,

    /// Session the token was issued for
    pub sid: String,

    /// Account email at issue time
    pub email: String,

    /// Whether the email was verified at issue time
    pub is_verified: bool,
}

impl Claims {
    /// Creates claims for an access token valid for `lifetime`
    pub fn new_access_token(
        user_id: Uuid,
        session_id: Uuid,
        email: String,
        is_verified: bool,
        lifetime: Duration,
        issuer: &str,
        audience: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            nbf: now.timestamp(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            jti: Uuid::new_v4().to_string(),
            sid: session_id.to_string(),
            email,
            is_verified,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }

    pub fn session_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sid)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

/// Refresh token record; only the SHA-256 of the token is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub session_id: Uuid,

    /// Hex encoded SHA-256 of the token handed to the client
    pub token_hash: String,

    /// Shared by every token produced by rotating the same login
    pub token_family: Uuid,

    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_revoked: bool,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    /// Starts a new token family
    pub fn new(user_id: Uuid, session_id: Uuid, token_hash: String, lifetime: Duration) -> Self {
        Self::in_family(user_id, session_id, token_hash, Uuid::new_v4(), lifetime)
    }

    /// Creates the next token of an existing family
    pub fn in_family(
        user_id: Uuid,
        session_id: Uuid,
        token_hash: String,
        token_family: Uuid,
        lifetime: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            session_id,
            token_hash,
            token_family,
            created_at: now,
            expires_at: now + lifetime,
            is_revoked: false,
            revoked_at: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// A token is valid if it hasn't expired and hasn't been revoked
    pub fn is_valid(&self) -> bool {
        !self.is_expired() && !self.is_revoked
    }

    pub fn revoke(&mut self) {
        self.is_revoked = true;
        self.revoked_at = Some(Utc::now());
    }
}

/// Token pair returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// Opaque refresh token
    pub refresh_token: String,

    /// Access token expiry time in seconds
    pub access_expires_in: i64,

    /// Refresh token expiry time in seconds
    pub refresh_expires_in: i64,
}
