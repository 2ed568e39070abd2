//! Token service module for JWT management
//!
//! This module handles all token-related operations including:
//! - HS256 access token generation and verification
//! - Opaque refresh tokens with rotation and reuse detection
//! - Access token blacklisting on logout

mod config;
mod service;

#[cfg(test)]
mod tests;

pub use config::TokenServiceConfig;
pub use service::TokenService;
