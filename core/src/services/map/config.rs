use sb_shared::MapsConfig;

#[derive(Debug, Clone)]
pub struct MapServiceConfig {
    pub default_radius_km: f64,
    pub max_radius_km: f64,
    /// Upper bound for `limit` in nearby searches
    pub max_results: usize,
}

impl Default for MapServiceConfig {
    fn default() -> Self {
        Self::from(&MapsConfig::default())
    }
}

impl From<&MapsConfig> for MapServiceConfig {
    fn from(config: &MapsConfig) -> Self {
        Self {
            default_radius_km: config.default_radius_km,
            max_radius_km: config.max_radius_km,
            max_results: config.max_results,
        }
    }
}
