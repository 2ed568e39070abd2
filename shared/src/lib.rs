//! Shared utilities and common types for the Sombreando server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration loaded from the environment
//! - Error response structures
//! - Utility functions (input validation, device detection)
//! - Common type definitions (coordinates, pagination, responses)

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, ConfigError, CorsConfig, DatabaseConfig, EmailBackend, EmailConfig,
    Environment, JwtConfig, LoggingConfig, MapsConfig, PaymentConfig, RateLimitConfig,
    RateLimitRule, ServerConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use types::{
    ApiResponse, BoundingBox, Coordinate, HealthResponse, Language, MessageResponse, Paginated,
    Pagination,
};
pub use utils::{device, validation};
