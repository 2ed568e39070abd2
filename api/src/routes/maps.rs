//! Map marker endpoints

use actix_web::{web, HttpRequest, HttpResponse};
use uuid::Uuid;

use sb_core::errors::ValidationError;
use sb_core::services::NearbyQuery;
use sb_shared::{Coordinate, Pagination};

use crate::dto::maps::{MarkerRequest, NearbyParams};
use crate::handlers::{api_error, request_language, validated, ApiError};
use crate::middleware::{AuthContext, JwtAuth};
use crate::state::AppState;

/// Mounts the `/maps` scope; every endpoint needs a JWT
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/maps/markers")
            .service(
                web::resource("/")
                    .wrap(JwtAuth::new())
                    .route(web::get().to(list_markers))
                    .route(web::post().to(create_marker)),
            )
            // Registered before `/{id}/` so "nearby" is not parsed as an id
            .service(
                web::resource("/nearby/")
                    .wrap(JwtAuth::new())
                    .route(web::get().to(nearby)),
            )
            .service(
                web::resource("/{id}/")
                    .wrap(JwtAuth::new())
                    .route(web::get().to(get_marker))
                    .route(web::put().to(update_marker))
                    .route(web::delete().to(delete_marker)),
            ),
    );
}

/// Handler for GET /api/v1/maps/markers/?page=&per_page=
///
/// The caller's own markers, newest first.
pub async fn list_markers(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
    query: web::Query<Pagination>,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let page = state
        .maps
        .list_my_markers(auth.user_id, query.into_inner())
        .await
        .map_err(api_error(lang))?;
    Ok(HttpResponse::Ok().json(page))
}

/// Handler for POST /api/v1/maps/markers/
pub async fn create_marker(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
    body: web::Json<MarkerRequest>,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let payload = validated(body.into_inner(), lang)?;

    let marker = state
        .maps
        .create_marker(auth.user_id, payload.into())
        .await
        .map_err(api_error(lang))?;
    Ok(HttpResponse::Created().json(marker))
}

/// Handler for GET /api/v1/maps/markers/nearby/?lat=&lng=&radius_km=&category=&limit=
///
/// Public markers and the caller's own within the radius, nearest first,
/// each with its `distance_m`.
pub async fn nearby(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
    query: web::Query<NearbyParams>,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let params = validated(query.into_inner(), lang)?;

    let center = Coordinate::new(params.lat, params.lng)
        .ok_or_else(|| ApiError::new(ValidationError::InvalidCoordinate.into(), lang))?;

    let markers = state
        .maps
        .search_nearby(
            auth.user_id,
            NearbyQuery {
                center,
                radius_km: params.radius_km,
                category: params.category.as_deref(),
                limit: params.limit,
            },
        )
        .await
        .map_err(api_error(lang))?;
    Ok(HttpResponse::Ok().json(markers))
}

/// Handler for GET /api/v1/maps/markers/{id}/
///
/// Private markers of other users answer 404.
pub async fn get_marker(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let marker = state
        .maps
        .get_marker(auth.user_id, path.into_inner())
        .await
        .map_err(api_error(lang))?;
    Ok(HttpResponse::Ok().json(marker))
}

/// Handler for PUT /api/v1/maps/markers/{id}/
///
/// Replaces every editable field. Owner only.
pub async fn update_marker(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
    body: web::Json<MarkerRequest>,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    let payload = validated(body.into_inner(), lang)?;

    let marker = state
        .maps
        .update_marker(auth.user_id, path.into_inner(), payload.into())
        .await
        .map_err(api_error(lang))?;
    Ok(HttpResponse::Ok().json(marker))
}

/// Handler for DELETE /api/v1/maps/markers/{id}/
pub async fn delete_marker(
    req: HttpRequest,
    state: web::Data<AppState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let lang = request_language(&req);
    state
        .maps
        .delete_marker(auth.user_id, path.into_inner())
        .await
        .map_err(api_error(lang))?;
    Ok(HttpResponse::NoContent().finish())
}
