use sb_shared::types::{Coordinate, Paginated, Pagination};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::map_marker::{
    MapMarker, MarkerDraft, MAX_CATEGORY_LENGTH, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH,
};
use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::repositories::MapMarkerRepository;

use super::config::MapServiceConfig;

/// Candidates fetched from the bounding box before exact filtering
const MAX_CANDIDATES: usize = 1_000;

/// Parameters of a nearby search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyQuery<'a> {
    pub center: Coordinate,
    pub radius_km: Option<f64>,
    pub category: Option<&'a str>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyMarker {
    #[serde(flatten)]
    pub marker: MapMarker,
    pub distance_m: f64,
}

pub struct MapService {
    repository: Arc<dyn MapMarkerRepository>,
    config: MapServiceConfig,
}

impl MapService {
    pub fn new(repository: Arc<dyn MapMarkerRepository>, config: MapServiceConfig) -> Self {
        Self { repository, config }
    }

    pub async fn create_marker(&self, owner_id: Uuid, draft: MarkerDraft) -> DomainResult<MapMarker> {
        let draft = validate_draft(draft)?;
        let marker = self.repository.create(MapMarker::new(owner_id, draft)).await?;

        tracing::info!(
            user_id = %owner_id,
            marker_id = %marker.id,
            event = "marker_created",
            "Map marker created"
        );
        Ok(marker)
    }

    /// Private markers of other users are reported as missing
    pub async fn get_marker(&self, viewer: Uuid, marker_id: Uuid) -> DomainResult<MapMarker> {
        match self.repository.find_by_id(marker_id).await? {
            Some(marker) if marker.is_visible_to(viewer) => Ok(marker),
            _ => Err(DomainError::not_found("Marker")),
        }
    }

    async fn owned_marker(&self, user_id: Uuid, marker_id: Uuid) -> DomainResult<MapMarker> {
        let marker = self
            .repository
            .find_by_id(marker_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Marker"))?;
        if marker.owner_id != user_id {
            tracing::warn!(
                user_id = %user_id,
                marker_id = %marker_id,
                "Attempt to modify another user's marker"
            );
            return Err(DomainError::Forbidden);
        }
        Ok(marker)
    }

    pub async fn update_marker(
        &self,
        user_id: Uuid,
        marker_id: Uuid,
        draft: MarkerDraft,
    ) -> DomainResult<MapMarker> {
        let draft = validate_draft(draft)?;
        let mut marker = self.owned_marker(user_id, marker_id).await?;
        marker.apply(draft);
        self.repository.update(marker).await
    }

    pub async fn delete_marker(&self, user_id: Uuid, marker_id: Uuid) -> DomainResult<()> {
        let marker = self.owned_marker(user_id, marker_id).await?;
        self.repository.delete(marker.id).await?;

        tracing::info!(user_id = %user_id, marker_id = %marker_id, event = "marker_deleted", "Map marker deleted");
        Ok(())
    }

    pub async fn list_my_markers(
        &self,
        user_id: Uuid,
        pagination: Pagination,
    ) -> DomainResult<Paginated<MapMarker>> {
        self.repository.list_by_owner(user_id, pagination.validate()).await
    }

    /// Markers within `radius_km` of `center`, nearest first
    pub async fn search_nearby(&self, viewer: Uuid, query: NearbyQuery<'_>) -> DomainResult<Vec<NearbyMarker>> {
        if !query.center.is_valid() {
            return Err(ValidationError::InvalidCoordinate.into());
        }

        let radius_km = query.radius_km.unwrap_or(self.config.default_radius_km);
        if !(radius_km > 0.0 && radius_km <= self.config.max_radius_km) {
            return Err(ValidationError::OutOfRange {
                field: "radius_km".to_string(),
                min: "0".to_string(),
                max: self.config.max_radius_km.to_string(),
            }
            .into());
        }
        let limit = query
            .limit
            .unwrap_or(self.config.max_results)
            .clamp(1, self.config.max_results);

        // stored categories are trimmed and lowercased
        let category = query
            .category
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty());

        let radius_m = radius_km * 1000.0;
        let candidates = self
            .repository
            .find_in_bounds(
                query.center.bounding_box(radius_m),
                viewer,
                category.as_deref(),
                MAX_CANDIDATES,
            )
            .await?;

        let mut nearby: Vec<NearbyMarker> = candidates
            .into_iter()
            .filter(|marker| marker.is_visible_to(viewer))
            .map(|marker| {
                let distance_m = query.center.distance_to(&marker.coordinate());
                NearbyMarker { marker, distance_m }
            })
            .filter(|n| n.distance_m <= radius_m)
            .collect();

        nearby.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
        nearby.truncate(limit);
        Ok(nearby)
    }
}

/// Trims text fields and checks limits
fn validate_draft(mut draft: MarkerDraft) -> DomainResult<MarkerDraft> {
    if Coordinate::new(draft.latitude, draft.longitude).is_none() {
        return Err(ValidationError::InvalidCoordinate.into());
    }

    draft.title = draft.title.trim().to_string();
    if draft.title.is_empty() {
        return Err(ValidationError::RequiredField {
            field: "title".to_string(),
        }
        .into());
    }
    check_length("title", &draft.title, MAX_TITLE_LENGTH)?;

    draft.description = draft
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    if let Some(description) = &draft.description {
        check_length("description", description, MAX_DESCRIPTION_LENGTH)?;
    }

    draft.category = draft
        .category
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty());
    if let Some(category) = &draft.category {
        check_length("category", category, MAX_CATEGORY_LENGTH)?;
    }

    if let Some(metadata) = &draft.metadata {
        if !metadata.is_object() {
            return Err(ValidationError::InvalidFormat {
                field: "metadata".to_string(),
            }
            .into());
        }
    }

    Ok(draft)
}

fn check_length(field: &str, value: &str, max: usize) -> DomainResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }
        .into());
    }
    Ok(())
}
