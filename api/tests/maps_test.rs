//! Integration tests for the map marker endpoints

#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{json, Value};

fn marker(title: &str, lat: f64, lng: f64, category: &str, public: bool) -> Value {
    json!({
        "title": title,
        "description": "Ponto de sombra",
        "latitude": lat,
        "longitude": lng,
        "category": category,
        "metadata": { "trees": 3 },
        "is_public": public,
    })
}

#[actix_web::test]
async fn test_marker_crud() {
    let ctx = common::context();
    let app = init_app!(ctx);

    let login = signed_in!(app, ctx, "mapper@example.com", "mapper");
    let access = login["access_token"].as_str().unwrap();

    let (status, created) = call_json!(
        app,
        common::bearer(
            common::post_json(
                "/api/v1/maps/markers/",
                marker("  Praça da Sé ", -23.5505, -46.6333, "Praça", true)
            ),
            access
        )
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "Praça da Sé");
    assert_eq!(created["category"], "praça");
    assert_eq!(created["metadata"]["trees"], 3);
    assert_eq!(created["owner_id"], login["user"]["id"]);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, fetched) = call_json!(
        app,
        common::bearer(test::TestRequest::get().uri(&format!("/api/v1/maps/markers/{}/", id)), access)
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], id.as_str());

    let (status, updated) = call_json!(
        app,
        common::bearer(
            test::TestRequest::put()
                .uri(&format!("/api/v1/maps/markers/{}/", id))
                .set_json(marker("Catedral da Sé", -23.5510, -46.6340, "igreja", false)),
            access
        )
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Catedral da Sé");
    assert_eq!(updated["is_public"], false);

    let (status, page) = call_json!(
        app,
        common::bearer(test::TestRequest::get().uri("/api/v1/maps/markers/?page=1&per_page=10"), access)
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["id"], id.as_str());

    let resp = test::call_service(
        &app,
        common::bearer(
            test::TestRequest::delete().uri(&format!("/api/v1/maps/markers/{}/", id)),
            access,
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let (status, _) = call_json!(
        app,
        common::bearer(test::TestRequest::get().uri(&format!("/api/v1/maps/markers/{}/", id)), access)
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_marker_validation() {
    let ctx = common::context();
    let app = init_app!(ctx);

    let login = signed_in!(app, ctx, "strict@example.com", "strict");
    let access = login["access_token"].as_str().unwrap();

    let (status, _) = call_json!(
        app,
        common::bearer(
            common::post_json("/api/v1/maps/markers/", marker("Fora", 91.0, 0.0, "x", true)),
            access
        )
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call_json!(
        app,
        common::bearer(
            common::post_json("/api/v1/maps/markers/", marker("   ", 0.0, 0.0, "x", true)),
            access
        )
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut bad_metadata = marker("Lista", 0.0, 0.0, "x", true);
    bad_metadata["metadata"] = json!([1, 2, 3]);
    let (status, _) = call_json!(
        app,
        common::bearer(common::post_json("/api/v1/maps/markers/", bad_metadata), access)
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call_json!(
        app,
        common::bearer(test::TestRequest::get().uri("/api/v1/maps/markers/not-a-uuid/"), access)
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_markers_of_other_users() {
    let ctx = common::context();
    let app = init_app!(ctx);

    let owner = signed_in!(app, ctx, "alice@example.com", "alice");
    let stranger = signed_in!(app, ctx, "bruno@example.com", "bruno");
    let owner_token = owner["access_token"].as_str().unwrap();
    let stranger_token = stranger["access_token"].as_str().unwrap();

    let (_, public) = call_json!(
        app,
        common::bearer(
            common::post_json("/api/v1/maps/markers/", marker("Parque", -23.58, -46.66, "parque", true)),
            owner_token
        )
    );
    let (_, private) = call_json!(
        app,
        common::bearer(
            common::post_json("/api/v1/maps/markers/", marker("Quintal", -23.57, -46.65, "casa", false)),
            owner_token
        )
    );
    let public_id = public["id"].as_str().unwrap();
    let private_id = private["id"].as_str().unwrap();

    let (status, _) = call_json!(
        app,
        common::bearer(
            test::TestRequest::get().uri(&format!("/api/v1/maps/markers/{}/", public_id)),
            stranger_token
        )
    );
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call_json!(
        app,
        common::bearer(
            test::TestRequest::get().uri(&format!("/api/v1/maps/markers/{}/", private_id)),
            stranger_token
        )
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call_json!(
        app,
        common::bearer(
            test::TestRequest::put()
                .uri(&format!("/api/v1/maps/markers/{}/", public_id))
                .set_json(marker("Meu parque", -23.58, -46.66, "parque", true)),
            stranger_token
        )
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");

    let (status, _) = call_json!(
        app,
        common::bearer(
            test::TestRequest::delete().uri(&format!("/api/v1/maps/markers/{}/", public_id)),
            stranger_token
        )
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, page) = call_json!(
        app,
        common::bearer(test::TestRequest::get().uri("/api/v1/maps/markers/"), stranger_token)
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 0);
}

#[actix_web::test]
async fn test_nearby_search() {
    let ctx = common::context();
    let app = init_app!(ctx);

    let owner = signed_in!(app, ctx, "carla@example.com", "carla");
    let viewer = signed_in!(app, ctx, "diego@example.com", "diego");
    let owner_token = owner["access_token"].as_str().unwrap();
    let viewer_token = viewer["access_token"].as_str().unwrap();

    for body in [
        marker("Paulista", -23.5614, -46.6559, "avenida", true),
        marker("Sé", -23.5505, -46.6333, "praca", true),
        marker("Escondido", -23.5510, -46.6340, "praca", false),
        marker("Rio", -22.9068, -43.1729, "praia", true),
    ] {
        let (status, _) = call_json!(
            app,
            common::bearer(common::post_json("/api/v1/maps/markers/", body), owner_token)
        );
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, found) = call_json!(
        app,
        common::bearer(
            test::TestRequest::get().uri("/api/v1/maps/markers/nearby/?lat=-23.5505&lng=-46.6333&radius_km=5"),
            viewer_token
        )
    );
    assert_eq!(status, StatusCode::OK);
    let found = found.as_array().unwrap().clone();
    let titles: Vec<&str> = found.iter().map(|m| m["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Sé", "Paulista"]);
    assert!(found[0]["distance_m"].as_f64().unwrap() < 1.0);
    assert!(found[1]["distance_m"].as_f64().unwrap() > 1000.0);

    // The owner also sees their private marker
    let (status, own) = call_json!(
        app,
        common::bearer(
            test::TestRequest::get()
                .uri("/api/v1/maps/markers/nearby/?lat=-23.5505&lng=-46.6333&radius_km=5&category=praca"),
            owner_token
        )
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(own.as_array().unwrap().len(), 2);

    let (status, mixed_case) = call_json!(
        app,
        common::bearer(
            test::TestRequest::get()
                .uri("/api/v1/maps/markers/nearby/?lat=-23.5505&lng=-46.6333&radius_km=5&category=PRACA"),
            owner_token
        )
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mixed_case.as_array().unwrap().len(), 2);

    let (status, limited) = call_json!(
        app,
        common::bearer(
            test::TestRequest::get().uri("/api/v1/maps/markers/nearby/?lat=-23.5505&lng=-46.6333&radius_km=5&limit=1"),
            viewer_token
        )
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(limited.as_array().unwrap().len(), 1);

    let (status, _) = call_json!(
        app,
        common::bearer(
            test::TestRequest::get().uri("/api/v1/maps/markers/nearby/?lat=-23.5505&lng=-46.6333&radius_km=500"),
            viewer_token
        )
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call_json!(
        app,
        common::bearer(
            test::TestRequest::get().uri("/api/v1/maps/markers/nearby/?lat=95&lng=0"),
            viewer_token
        )
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_maps_require_authentication() {
    let ctx = common::context();
    let app = init_app!(ctx);

    let (status, _) = call_json!(app, test::TestRequest::get().uri("/api/v1/maps/markers/"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call_json!(
        app,
        test::TestRequest::get().uri("/api/v1/maps/markers/nearby/?lat=0&lng=0")
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
