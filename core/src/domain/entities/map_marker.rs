//! User-created points of interest shown on the map.

use chrono::{DateTime, Utc};
use sb_shared::types::Coordinate;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;
pub const MAX_CATEGORY_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub category: Option<String>,
    /// Free-form JSON object supplied by the client
    pub metadata: JsonValue,
    /// Visible to other users in nearby searches
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or replacing a marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerDraft {
    pub title: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub category: Option<String>,
    pub metadata: Option<JsonValue>,
    pub is_public: bool,
}

impl MapMarker {
    pub fn new(owner_id: Uuid, draft: MarkerDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: draft.title,
            description: draft.description,
            latitude: draft.latitude,
            longitude: draft.longitude,
            category: draft.category,
            metadata: draft.metadata.unwrap_or_else(|| JsonValue::Object(Default::default())),
            is_public: draft.is_public,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Replace every editable field with the draft's values
    pub fn apply(&mut self, draft: MarkerDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.latitude = draft.latitude;
        self.longitude = draft.longitude;
        self.category = draft.category;
        if let Some(metadata) = draft.metadata {
            self.metadata = metadata;
        }
        self.is_public = draft.is_public;
        self.updated_at = Utc::now();
    }

    /// Whether `viewer` may see this marker
    pub fn is_visible_to(&self, viewer: Uuid) -> bool {
        self.is_public || self.owner_id == viewer
    }
}
