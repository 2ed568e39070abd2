use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use sb_core::domain::entities::{
    ProfileLanguage, ProfileUpdate, ProfileVisibility, User, UserProfile, UserProfileUpdate,
};
use sb_core::domain::value_objects::AccountProfile;
use sb_core::services::{LoginInput, RegisterInput};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email, length(max = 254))]
    pub email: String,

    /// Letters, digits and underscores; checked in full by the service
    #[validate(length(min = 3, max = 30))]
    pub username: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,

    #[validate(length(min = 1, max = 128))]
    pub password_confirm: String,

    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,

    #[validate(length(max = 20))]
    pub phone: Option<String>,

    #[validate(length(max = 200))]
    pub company_name: Option<String>,
}

impl From<RegisterRequest> for RegisterInput {
    fn from(request: RegisterRequest) -> Self {
        Self {
            email: request.email,
            username: request.username,
            password: request.password,
            password_confirm: request.password_confirm,
            first_name: request.first_name,
            last_name: request.last_name,
            phone: request.phone,
            company_name: request.company_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,

    /// 6-digit code, required when 2FA is enabled
    #[validate(length(equal = 6))]
    pub verification_code: Option<String>,
}

impl From<LoginRequest> for LoginInput {
    fn from(request: LoginRequest) -> Self {
        Self {
            email: request.email,
            password: request.password,
            verification_code: request.verification_code,
        }
    }
}

/// Body of a 202 login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoFactorRequiredResponse {
    pub requires_2fa: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[serde(alias = "refresh")]
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogoutRequest {
    #[serde(default, alias = "refresh")]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 150))]
    pub first_name: Option<String>,

    #[validate(length(max = 150))]
    pub last_name: Option<String>,

    #[validate(length(max = 20))]
    pub phone: Option<String>,

    #[validate(length(max = 200))]
    pub company_name: Option<String>,

    #[validate]
    #[serde(default)]
    pub profile: Option<PreferencesRequest>,
}

/// A present `null` becomes `Some(None)` so it can clear the field
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// The nested `profile` object of a profile update
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PreferencesRequest {
    #[validate(length(max = 500))]
    pub bio: Option<String>,

    #[validate(length(max = 100))]
    pub location: Option<String>,

    /// Empty string clears it; otherwise an http(s) URL
    #[validate(length(max = 200))]
    pub website: Option<String>,

    #[serde(default, deserialize_with = "present")]
    pub birth_date: Option<Option<NaiveDate>>,

    pub language: Option<ProfileLanguage>,

    #[validate(length(min = 1, max = 50))]
    pub timezone: Option<String>,

    pub email_notifications: Option<bool>,
    pub push_notifications: Option<bool>,
    pub marketing_emails: Option<bool>,
    pub profile_visibility: Option<ProfileVisibility>,
}

impl From<PreferencesRequest> for UserProfileUpdate {
    fn from(request: PreferencesRequest) -> Self {
        Self {
            bio: request.bio,
            location: request.location,
            website: request.website,
            birth_date: request.birth_date,
            language: request.language,
            timezone: request.timezone,
            email_notifications: request.email_notifications,
            push_notifications: request.push_notifications,
            marketing_emails: request.marketing_emails,
            profile_visibility: request.profile_visibility,
        }
    }
}

impl UpdateProfileRequest {
    /// Split into account fields and extended profile fields
    pub fn into_updates(self) -> (ProfileUpdate, UserProfileUpdate) {
        let preferences = self.profile.map(UserProfileUpdate::from).unwrap_or_default();
        let update = ProfileUpdate {
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            company_name: self.company_name,
        };
        (update, preferences)
    }
}

/// The user object with its extended profile nested under `profile`
#[derive(Debug, Clone, Serialize)]
pub struct AccountProfileResponse {
    #[serde(flatten)]
    pub user: User,
    pub profile: UserProfile,
}

impl From<AccountProfile> for AccountProfileResponse {
    fn from(account: AccountProfile) -> Self {
        Self {
            user: account.user,
            profile: account.profile,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, max = 128))]
    pub old_password: String,

    #[validate(length(min = 1, max = 128))]
    pub new_password: String,

    #[validate(length(min = 1, max = 128))]
    pub new_password_confirm: String,
}

/// Body carrying only an email: password reset request, verification resend
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PasswordResetConfirmRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(equal = 6))]
    pub code: String,

    #[validate(length(min = 1, max = 128))]
    pub new_password: String,

    #[validate(length(min = 1, max = 128))]
    pub new_password_confirm: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyEmailRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(equal = 6))]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ToggleTwoFactorRequest {
    pub enable: bool,

    /// Code emailed by the first enabling call
    #[validate(length(equal = 6))]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoFactorStatusResponse {
    pub is_2fa_enabled: bool,
    pub message: String,
}

/// Body of a 202 toggle response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRequiredResponse {
    pub requires_verification: bool,
    pub message: String,
}

/// Availability check of an email; the format is checked by the service
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmailCheckRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UsernameCheckRequest {
    #[validate(length(min = 1, max = 30))]
    pub username: String,
}
