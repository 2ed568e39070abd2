//! # Sombreando Core
//!
//! Domain layer for the Sombreando backend: entities, repository traits with
//! in-memory implementations, and the services behind authentication,
//! payments and map markers.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
