use async_trait::async_trait;
use sb_shared::types::{BoundingBox, Paginated, Pagination};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use sb_core::domain::entities::map_marker::MapMarker;
use sb_core::errors::DomainError;
use sb_core::repositories::MapMarkerRepository;

use crate::database::db_error;

const MARKER_COLUMNS: &str = "id, owner_id, title, description, latitude, longitude, category, metadata, is_public, created_at, updated_at";

pub struct PostgresMapMarkerRepository {
    pool: PgPool,
}

impl PostgresMapMarkerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_marker(row: &PgRow) -> Result<MapMarker, DomainError> {
        let map = |e: sqlx::Error| DomainError::Internal {
            message: format!("Failed to read marker row: {}", e),
        };

        Ok(MapMarker {
            id: row.try_get("id").map_err(map)?,
            owner_id: row.try_get("owner_id").map_err(map)?,
            title: row.try_get("title").map_err(map)?,
            description: row.try_get("description").map_err(map)?,
            latitude: row.try_get("latitude").map_err(map)?,
            longitude: row.try_get("longitude").map_err(map)?,
            category: row.try_get("category").map_err(map)?,
            metadata: row.try_get("metadata").map_err(map)?,
            is_public: row.try_get("is_public").map_err(map)?,
            created_at: row.try_get("created_at").map_err(map)?,
            updated_at: row.try_get("updated_at").map_err(map)?,
        })
    }
}

#[async_trait]
impl MapMarkerRepository for PostgresMapMarkerRepository {
    async fn create(&self, marker: MapMarker) -> Result<MapMarker, DomainError> {
        let query = format!(
            "INSERT INTO map_markers ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
            MARKER_COLUMNS
        );

        sqlx::query(&query)
            .bind(marker.id)
            .bind(marker.owner_id)
            .bind(&marker.title)
            .bind(&marker.description)
            .bind(marker.latitude)
            .bind(marker.longitude)
            .bind(&marker.category)
            .bind(&marker.metadata)
            .bind(marker.is_public)
            .bind(marker.created_at)
            .bind(marker.updated_at)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to create marker"))?;

        Ok(marker)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MapMarker>, DomainError> {
        let query = format!("SELECT {} FROM map_markers WHERE id = $1", MARKER_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find marker"))?;
        row.as_ref().map(Self::row_to_marker).transpose()
    }

    async fn update(&self, marker: MapMarker) -> Result<MapMarker, DomainError> {
        let query = r#"
            UPDATE map_markers SET
                title = $2, description = $3, latitude = $4, longitude = $5,
                category = $6, metadata = $7, is_public = $8, updated_at = $9
            WHERE id = $1
        "#;

        let result = sqlx::query(query)
            .bind(marker.id)
            .bind(&marker.title)
            .bind(&marker.description)
            .bind(marker.latitude)
            .bind(marker.longitude)
            .bind(&marker.category)
            .bind(&marker.metadata)
            .bind(marker.is_public)
            .bind(marker.updated_at)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to update marker"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Marker"));
        }
        Ok(marker)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM map_markers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete marker"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        pagination: Pagination,
    ) -> Result<Paginated<MapMarker>, DomainError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM map_markers WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count markers"))?;

        let query = format!(
            "SELECT {} FROM map_markers WHERE owner_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
            MARKER_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(owner_id)
            .bind(pagination.limit() as i64)
            .bind(pagination.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list markers"))?;

        let items = rows
            .iter()
            .map(Self::row_to_marker)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Paginated::new(items, total as u64, pagination))
    }

    async fn find_in_bounds(
        &self,
        bounds: BoundingBox,
        viewer: Uuid,
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<MapMarker>, DomainError> {
        let query = format!(
            "SELECT {} FROM map_markers
             WHERE latitude BETWEEN $1 AND $2
               AND (($3 <= $4 AND longitude BETWEEN $3 AND $4)
                    OR ($3 > $4 AND (longitude >= $3 OR longitude <= $4)))
               AND (is_public = TRUE OR owner_id = $5)
               AND ($6::varchar IS NULL OR category = $6)
             LIMIT $7",
            MARKER_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(bounds.min_latitude)
            .bind(bounds.max_latitude)
            .bind(bounds.min_longitude)
            .bind(bounds.max_longitude)
            .bind(viewer)
            .bind(category)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to search markers"))?;

        rows.iter().map(Self::row_to_marker).collect()
    }
}
