//! Authentication results handed back to the presentation layer.

use serde::{Deserialize, Serialize};

use crate::domain::entities::token::TokenPair;
use crate::domain::entities::user::User;

/// Tokens plus the authenticated user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Always `Bearer`
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    /// Refresh token lifetime in seconds
    pub refresh_expires_in: i64,
    pub user: User,
}

impl AuthResponse {
    pub fn from_token_pair(token_pair: TokenPair, user: User) -> Self {
        Self {
            access_token: token_pair.access_token,
            refresh_token: token_pair.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: token_pair.access_expires_in,
            refresh_expires_in: token_pair.refresh_expires_in,
            user,
        }
    }
}

/// Result of a password login
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// Credentials (and code, if required) accepted
    Authenticated(Box<AuthResponse>),
    /// 2FA is on and a code was just emailed
    TwoFactorRequired,
}

/// Result of a 2FA toggle request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwoFactorToggle {
    /// The flag now has the requested value
    Updated { enabled: bool },
    /// A confirmation code was emailed; call again with it
    VerificationRequired,
}
