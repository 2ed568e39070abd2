//! Business services containing domain logic and use cases.

pub mod auth;
pub mod cleanup;
pub mod health;
pub mod map;
pub mod password;
pub mod payment;
pub mod rate_limit;
pub mod token;
pub mod verification;

// Re-export commonly used types
pub use auth::{AuthService, AuthServiceConfig, LoginInput, RegisterInput, RequestContext};
pub use cleanup::{CleanupConfig, CleanupReport, CleanupService};
pub use health::{HealthProbe, StaticProbe};
pub use map::{MapService, MapServiceConfig, NearbyMarker, NearbyQuery};
pub use password::PasswordService;
pub use payment::{
    NewPaymentMethod, PaymentService, PaymentServiceConfig, SubscriptionCheckout, WebhookEvent,
    WebhookOutcome,
};
pub use rate_limit::{rate_limit_key, InMemoryRateLimiter, RateLimitStatus, RateLimiterTrait};
pub use token::{TokenService, TokenServiceConfig};
pub use verification::{
    EmailMessage, EmailServiceTrait, SendCodeResult, VerificationService,
    VerificationServiceConfig,
};
