//! Authentication service module
//!
//! This module provides the account lifecycle:
//! - Registration with email verification
//! - Login with optional emailed second factor
//! - Token refresh and logout
//! - Password change and reset
//! - Sessions, statistics and the security log

mod config;
mod service;
mod types;

#[cfg(test)]
mod tests;

pub use config::AuthServiceConfig;
pub use service::AuthService;
pub use types::{LoginInput, RegisterInput, RequestContext};
