//! Domain-specific error types for authentication, tokens, validation and payments
//!
//! Messages here are for logs. The presentation layer owns the localized text
//! shown to users.

use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email not verified")]
    EmailNotVerified,

    #[error("Account inactive")]
    AccountInactive,

    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("Username already taken")]
    UsernameAlreadyExists,

    #[error("User not found")]
    UserNotFound,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Current password is incorrect")]
    IncorrectPassword,

    #[error("New password must differ from the current one")]
    PasswordUnchanged,

    #[error("Weak password: {errors:?}")]
    WeakPassword { errors: Vec<String> },

    #[error("Email already verified")]
    AlreadyVerified,

    #[error("Invalid verification code")]
    InvalidVerificationCode,

    #[error("Verification code expired")]
    VerificationCodeExpired,

    #[error("Verification code already used")]
    VerificationCodeUsed,

    #[error("Maximum attempts exceeded")]
    MaxAttemptsExceeded,

    #[error("Rate limit exceeded: retry in {seconds} seconds")]
    RateLimitExceeded { seconds: u64 },

    #[error("Verification email sent recently: retry in {seconds} seconds")]
    ResendTooSoon { seconds: u64 },

    #[error("Email service failure")]
    EmailServiceFailure,

    #[error("Session not found")]
    SessionNotFound,
}

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token format")]
    InvalidTokenFormat,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token not yet valid")]
    TokenNotYetValid,

    #[error("Invalid claims")]
    InvalidClaims,

    #[error("Token revoked")]
    TokenRevoked,

    #[error("Token not found")]
    TokenNotFound,

    #[error("Refresh token reuse detected")]
    TokenReuseDetected,

    #[error("Token generation failed")]
    TokenGenerationFailed,
}

/// Input validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Required field: {field}")]
    RequiredField { field: String },

    #[error("Invalid format: {field}")]
    InvalidFormat { field: String },

    #[error("Out of range: {field} (min: {min}, max: {max})")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },

    #[error("Too long: {field} (max: {max})")]
    TooLong { field: String, max: usize },

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Email domain not allowed")]
    EmailDomainNotAllowed,

    #[error("Invalid coordinate")]
    InvalidCoordinate,
}

/// Payment and webhook errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PaymentError {
    #[error("Webhook signature missing")]
    MissingSignature,

    #[error("Webhook signature invalid")]
    InvalidSignature,

    #[error("Webhook timestamp outside tolerance")]
    StaleWebhook,

    #[error("Unsupported event: {event_type}")]
    UnsupportedEvent { event_type: String },

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Payment method expired")]
    PaymentMethodExpired,

    #[error("Subscription already active for plan {plan}")]
    AlreadySubscribed { plan: String },

    #[error("No active subscription")]
    NoActiveSubscription,
}
