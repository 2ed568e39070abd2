//! HTTP routes, mounted under `/api/v1` except for the health check

pub mod auth;
pub mod health;
pub mod maps;
pub mod payments;

use actix_web::web;

/// Everything under `/api/v1`
pub fn configure_v1(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(auth::configure)
            .configure(payments::configure)
            .configure(maps::configure),
    );
}
