pub mod login_attempt;
pub mod map_marker;
pub mod payment;
pub mod session;
pub mod token;
pub mod user;
pub mod user_profile;
pub mod verification;

pub use login_attempt::{InMemoryLoginAttemptRepository, LoginAttemptRepository};
pub use map_marker::{InMemoryMapMarkerRepository, MapMarkerRepository};
pub use payment::{InMemoryPaymentRepository, PaymentRepository};
pub use session::{InMemorySessionRepository, SessionRepository};
pub use token::{InMemoryTokenRepository, TokenRepository};
pub use user::{InMemoryUserRepository, UserRepository};
pub use user_profile::{InMemoryUserProfileRepository, UserProfileRepository};
pub use verification::{InMemoryVerificationTokenRepository, VerificationTokenRepository};
