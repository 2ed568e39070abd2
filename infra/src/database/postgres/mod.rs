//! PostgreSQL repository implementations

mod login_attempt_repository;
mod map_marker_repository;
mod payment_repository;
mod session_repository;
mod token_repository;
mod user_profile_repository;
mod user_repository;
mod verification_repository;

pub use login_attempt_repository::PostgresLoginAttemptRepository;
pub use map_marker_repository::PostgresMapMarkerRepository;
pub use payment_repository::PostgresPaymentRepository;
pub use session_repository::PostgresSessionRepository;
pub use token_repository::PostgresTokenRepository;
pub use user_profile_repository::PostgresUserProfileRepository;
pub use user_repository::PostgresUserRepository;
pub use verification_repository::PostgresVerificationTokenRepository;
