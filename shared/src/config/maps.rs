//! Map features configuration

use serde::{Deserialize, Serialize};
use std::env;

use super::env_parse;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MapsConfig {
    /// Public Mapbox token handed to clients
    pub mapbox_access_token: Option<String>,
    pub default_radius_km: f64,
    pub max_radius_km: f64,
    pub max_results: usize,
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            mapbox_access_token: None,
            default_radius_km: 10.0,
            max_radius_km: 100.0,
            max_results: 100,
        }
    }
}

impl MapsConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            mapbox_access_token: env::var("MAPBOX_ACCESS_TOKEN").ok(),
            default_radius_km: env_parse("MAPS_DEFAULT_RADIUS_KM", defaults.default_radius_km),
            max_radius_km: env_parse("MAPS_MAX_RADIUS_KM", defaults.max_radius_km),
            max_results: env_parse("MAPS_MAX_RESULTS", defaults.max_results),
        }
    }
}
