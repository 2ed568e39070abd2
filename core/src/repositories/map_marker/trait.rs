//! Map marker persistence.

use async_trait::async_trait;
use sb_shared::types::{BoundingBox, Paginated, Pagination};
use uuid::Uuid;

use crate::domain::entities::map_marker::MapMarker;
use crate::errors::DomainError;

#[async_trait]
pub trait MapMarkerRepository: Send + Sync {
    async fn create(&self, marker: MapMarker) -> Result<MapMarker, DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MapMarker>, DomainError>;

    async fn update(&self, marker: MapMarker) -> Result<MapMarker, DomainError>;

    /// Returns false if nothing was deleted
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Markers owned by a user, newest first
    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        pagination: Pagination,
    ) -> Result<Paginated<MapMarker>, DomainError>;

    /// Coarse pre-filter for nearby searches.
    ///
    /// Returns markers inside `bounds` visible to `viewer`; exact distance
    /// filtering happens in the caller.
    async fn find_in_bounds(
        &self,
        bounds: BoundingBox,
        viewer: Uuid,
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<MapMarker>, DomainError>;
}
