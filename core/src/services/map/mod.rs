//! Map markers and nearby search

mod config;
mod service;

pub use config::MapServiceConfig;
pub use service::{MapService, NearbyMarker, NearbyQuery};
