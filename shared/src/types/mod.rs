//! Type definitions module with domain-specific sub-modules
//!
//! - `common` - coordinates and bounding boxes
//! - `language` - response language negotiation
//! - `pagination` - pagination for list endpoints
//! - `response` - API response wrappers and health checks

pub mod common;
pub mod language;
pub mod pagination;
pub mod response;

pub use common::{BoundingBox, Coordinate, EARTH_RADIUS_M};
pub use language::Language;
pub use pagination::{Paginated, Pagination};
pub use response::{ApiResponse, ComponentHealth, HealthResponse, MessageResponse};
