use actix_web::{web, HttpServer};
use anyhow::Context;
use std::time::Duration;

use sb_api::{bootstrap, create_app, telemetry};
use sb_shared::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;

    if let Err(e) = telemetry::init_tracing(&config.logging) {
        eprintln!("tracing already initialised: {}", e);
    }

    tracing::info!(
        environment = %config.environment,
        version = env!("CARGO_PKG_VERSION"),
        "Starting Sombreando API"
    );

    let server_config = config.server.clone();
    let (state, cleanup) = bootstrap::build_state(config).await?;
    let _cleanup_task = cleanup.spawn();

    let data = web::Data::new(state);
    let bind_address = server_config.bind_address();
    tracing::info!(address = %bind_address, "Server listening");

    let mut server = HttpServer::new(move || create_app(data.clone()))
        .keep_alive(Duration::from_secs(server_config.keep_alive));
    if server_config.workers > 0 {
        server = server.workers(server_config.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}
