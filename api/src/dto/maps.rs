use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use sb_core::domain::entities::MarkerDraft;

fn default_public() -> bool {
    true
}

/// Body for creating or replacing a marker
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MarkerRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    #[validate(length(max = 50))]
    pub category: Option<String>,

    /// Must be a JSON object when present
    pub metadata: Option<Value>,

    #[serde(default = "default_public")]
    pub is_public: bool,
}

impl From<MarkerRequest> for MarkerDraft {
    fn from(request: MarkerRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            latitude: request.latitude,
            longitude: request.longitude,
            category: request.category,
            metadata: request.metadata,
            is_public: request.is_public,
        }
    }
}

/// `GET /maps/markers/nearby/?lat=..&lng=..`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NearbyParams {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,

    pub radius_km: Option<f64>,

    pub category: Option<String>,

    #[validate(range(min = 1, max = 500))]
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_are_public_by_default() {
        let request: MarkerRequest =
            serde_json::from_str(r#"{"title": "Praça", "latitude": -23.55, "longitude": -46.63}"#).unwrap();
        assert!(request.is_public);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_coordinates() {
        let request: MarkerRequest =
            serde_json::from_str(r#"{"title": "X", "latitude": 95.0, "longitude": -46.63}"#).unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("latitude"));
    }
}
