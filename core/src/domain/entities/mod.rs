//! Domain entities representing core business objects.

pub mod login_attempt;
pub mod map_marker;
pub mod payment;
pub mod session;
pub mod token;
pub mod user;
pub mod user_profile;
pub mod verification_token;

pub use login_attempt::{LoginAttempt, LoginFailureReason};
pub use map_marker::{MapMarker, MarkerDraft};
pub use payment::{
    PaymentIntent, PaymentMethod, PaymentStatus, Subscription, SubscriptionStatus,
    BILLING_PERIOD_DAYS,
};
pub use session::{UserSession, SESSION_IDLE_DAYS};
pub use token::{
    Claims, RefreshToken, TokenPair, ACCESS_TOKEN_EXPIRY_MINUTES, JWT_AUDIENCE, JWT_ISSUER,
    REFRESH_TOKEN_EXPIRY_DAYS,
};
pub use user::{ProfileUpdate, SubscriptionPlan, User};
pub use user_profile::{ProfileLanguage, ProfileVisibility, UserProfile, UserProfileUpdate};
pub use verification_token::{
    EmailVerificationToken, TokenPurpose, CODE_LENGTH, DEFAULT_EXPIRATION_HOURS, MAX_ATTEMPTS,
};
