//! Application factory
//!
//! Builds the Actix-web application around a shared [`AppState`]: extractor
//! settings, middleware stack, routes and the JSON 404 fallback.

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, Error, HttpRequest, HttpResponse,
};
use tracing_actix_web::TracingLogger;

use sb_shared::{error_codes, ErrorResponse};

use crate::handlers::error::localized;
use crate::handlers::{json_config, path_config, query_config, request_language};
use crate::middleware::{create_cors, ApiRateLimit, SecurityMiddleware};
use crate::routes::{self, health::health_check};
use crate::state::AppState;

/// Create and configure the application with all dependencies
pub fn create_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    let config = &state.config;

    let rate_limit = ApiRateLimit::new(
        state.rate_limiter.clone(),
        config.rate_limit.clone(),
        config.server.trusted_proxies.clone(),
    );
    let security = SecurityMiddleware::from_config(config.environment, &config.server);
    let cors = create_cors(&config.cors);
    let json = json_config(config.server.max_payload_size);

    App::new()
        .app_data(state)
        .app_data(json)
        .app_data(query_config())
        .app_data(path_config())
        // Innermost first: rate limit, security headers, CORS, request spans
        .wrap(rate_limit)
        .wrap(security)
        .wrap(cors)
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check))
        .configure(routes::configure_v1)
        .default_service(web::route().to(not_found))
}

/// Default 404 handler
async fn not_found(req: HttpRequest) -> HttpResponse {
    let lang = request_language(&req);
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        localized(lang, "Recurso não encontrado", "The requested resource was not found"),
    ))
}
