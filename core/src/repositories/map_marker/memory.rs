use async_trait::async_trait;
use sb_shared::types::{BoundingBox, Paginated, Pagination};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::map_marker::MapMarker;
use crate::errors::DomainError;

use super::trait_::MapMarkerRepository;

#[derive(Clone, Default)]
pub struct InMemoryMapMarkerRepository {
    markers: Arc<RwLock<HashMap<Uuid, MapMarker>>>,
}

impl InMemoryMapMarkerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MapMarkerRepository for InMemoryMapMarkerRepository {
    async fn create(&self, marker: MapMarker) -> Result<MapMarker, DomainError> {
        self.markers.write().await.insert(marker.id, marker.clone());
        Ok(marker)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MapMarker>, DomainError> {
        Ok(self.markers.read().await.get(&id).cloned())
    }

    async fn update(&self, marker: MapMarker) -> Result<MapMarker, DomainError> {
        let mut markers = self.markers.write().await;
        if !markers.contains_key(&marker.id) {
            return Err(DomainError::not_found("Marker"));
        }
        markers.insert(marker.id, marker.clone());
        Ok(marker)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.markers.write().await.remove(&id).is_some())
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        pagination: Pagination,
    ) -> Result<Paginated<MapMarker>, DomainError> {
        let markers = self.markers.read().await;
        let mut owned: Vec<MapMarker> = markers
            .values()
            .filter(|m| m.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = owned.len() as u64;
        let items = owned
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .collect();
        Ok(Paginated::new(items, total, pagination))
    }

    async fn find_in_bounds(
        &self,
        bounds: BoundingBox,
        viewer: Uuid,
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<MapMarker>, DomainError> {
        let markers = self.markers.read().await;
        Ok(markers
            .values()
            .filter(|m| m.is_visible_to(viewer))
            .filter(|m| bounds.contains(&m.coordinate()))
            .filter(|m| category.map_or(true, |c| m.category.as_deref() == Some(c)))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::map_marker::MarkerDraft;
    use sb_shared::types::Coordinate;

    fn marker(owner: Uuid, lat: f64, lng: f64, public: bool) -> MapMarker {
        MapMarker::new(
            owner,
            MarkerDraft {
                title: "Árvore".into(),
                description: None,
                latitude: lat,
                longitude: lng,
                category: Some("tree".into()),
                metadata: None,
                is_public: public,
            },
        )
    }

    #[tokio::test]
    async fn test_find_in_bounds_respects_visibility() {
        let repo = InMemoryMapMarkerRepository::new();
        let owner = Uuid::new_v4();
        let viewer = Uuid::new_v4();
        repo.create(marker(owner, -23.55, -46.63, true)).await.unwrap();
        repo.create(marker(owner, -23.551, -46.631, false)).await.unwrap();
        repo.create(marker(owner, -22.90, -43.17, true)).await.unwrap();

        let center = Coordinate::new(-23.55, -46.63).unwrap();
        let bounds = center.bounding_box(5_000.0);

        assert_eq!(repo.find_in_bounds(bounds, viewer, None, 10).await.unwrap().len(), 1);
        assert_eq!(repo.find_in_bounds(bounds, owner, None, 10).await.unwrap().len(), 2);
        assert!(repo
            .find_in_bounds(bounds, owner, Some("bench"), 10)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_list_by_owner_paginates() {
        let repo = InMemoryMapMarkerRepository::new();
        let owner = Uuid::new_v4();
        for _ in 0..3 {
            repo.create(marker(owner, 0.0, 0.0, true)).await.unwrap();
        }
        repo.create(marker(Uuid::new_v4(), 0.0, 0.0, true)).await.unwrap();

        let page = repo.list_by_owner(owner, Pagination::new(2, 2)).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 1);
    }
}
