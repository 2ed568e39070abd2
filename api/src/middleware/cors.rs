//! CORS configuration for the web and mobile clients.
//!
//! Outside production any origin is accepted. In production only the
//! origins listed in `ALLOWED_ORIGINS` are.

use actix_cors::Cors;
use actix_web::http::{header, Method};

use sb_shared::CorsConfig;

/// Creates a CORS middleware instance from configuration
pub fn create_cors(config: &CorsConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ACCEPT_LANGUAGE,
            header::CONTENT_TYPE,
            header::ORIGIN,
            header::HeaderName::from_static("x-requested-with"),
        ])
        .expose_headers(vec![
            header::RETRY_AFTER,
            header::HeaderName::from_static("x-request-id"),
        ])
        .max_age(config.max_age);

    if config.allow_any_origin {
        tracing::info!("CORS accepts any origin");
        cors = cors.allow_any_origin().supports_credentials();
    } else {
        for origin in config.allowed_origins.iter().filter(|o| !o.is_empty()) {
            tracing::info!(origin = %origin, "CORS origin allowed");
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};

    fn restricted() -> CorsConfig {
        CorsConfig {
            allow_any_origin: false,
            allowed_origins: vec!["https://app.sombreando.com".to_string()],
            max_age: 3600,
        }
    }

    #[actix_web::test]
    async fn test_allowed_origin_gets_cors_headers() {
        let app = test::init_service(
            App::new()
                .wrap(create_cors(&restricted()))
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "https://app.sombreando.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://app.sombreando.com"
        );
    }

    #[actix_web::test]
    async fn test_unknown_origin_gets_no_cors_headers() {
        let app = test::init_service(
            App::new()
                .wrap(create_cors(&restricted()))
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "https://evil.example.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[test]
    fn test_development_config_builds() {
        let _cors = create_cors(&CorsConfig::development());
    }
}
