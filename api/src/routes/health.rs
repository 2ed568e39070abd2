use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures_util::future::join_all;

use sb_shared::types::ComponentHealth;
use sb_shared::HealthResponse;

use crate::state::AppState;

pub const SERVICE_NAME: &str = "sombreando-api";

/// Handler for GET /health
///
/// Runs every dependency probe concurrently. Answers 503 when any fails so
/// the platform can take the instance out of rotation.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let checks = join_all(state.probes.iter().map(|probe| async move {
        let result = probe.check().await;
        ComponentHealth {
            name: probe.name().to_string(),
            healthy: result.is_ok(),
            error: result.err(),
        }
    }))
    .await;

    let mut report = HealthResponse {
        status: String::new(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        checks,
    };

    if report.is_healthy() {
        report.status = "healthy".to_string();
        HttpResponse::Ok().json(report)
    } else {
        report.status = "unhealthy".to_string();
        tracing::warn!(checks = ?report.checks, "Health check failed");
        HttpResponse::ServiceUnavailable().json(report)
    }
}
