//! Value objects representing immutable domain concepts.

pub mod account;
pub mod auth_response;

pub use account::{AccountProfile, Availability, UserStats};
pub use auth_response::{AuthResponse, LoginOutcome, TwoFactorToggle};
