//! Startup wiring: storage, rate limiter, email backend and health probes

use std::sync::Arc;

use anyhow::Context;

use sb_core::services::{CleanupConfig, CleanupService, HealthProbe, InMemoryRateLimiter, RateLimiterTrait, StaticProbe};
use sb_infra::cache::{connect_redis, RedisHealthProbe, RedisRateLimiter};
use sb_infra::database::{create_pool, run_migrations, PostgresHealthProbe};
use sb_infra::email::create_email_service;
use sb_shared::AppConfig;

use crate::state::{AppState, Repositories};

/// Build the application state and the cleanup job from configuration.
///
/// Without `DATABASE_URL` (only allowed outside production) the server runs
/// on in-memory storage. Without `REDIS_URL`, or when Redis is unreachable,
/// rate limits are kept per process.
pub async fn build_state(config: AppConfig) -> anyhow::Result<(AppState, Arc<CleanupService>)> {
    let mut probes: Vec<Arc<dyn HealthProbe>> = Vec::new();

    let repositories = if config.database.url.is_some() {
        let pool = create_pool(&config.database)
            .await
            .context("failed to connect to PostgreSQL")?;
        run_migrations(&pool).await.context("failed to apply migrations")?;
        probes.push(Arc::new(PostgresHealthProbe::new(pool.clone())));
        Repositories::postgres(pool)
    } else {
        tracing::warn!("DATABASE_URL not set, using in-memory storage");
        probes.push(Arc::new(StaticProbe::new("database")));
        Repositories::in_memory()
    };

    let rate_limiter: Arc<dyn RateLimiterTrait> = match config.cache.redis_url {
        Some(_) => match connect_redis(&config.cache).await {
            Ok(conn) => {
                probes.push(Arc::new(RedisHealthProbe::new(conn.clone())));
                Arc::new(RedisRateLimiter::new(conn, config.cache.key_prefix.clone()))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Redis unavailable, using in-memory rate limiter");
                Arc::new(InMemoryRateLimiter::new())
            }
        },
        None => {
            tracing::info!("REDIS_URL not set, using in-memory rate limiter");
            Arc::new(InMemoryRateLimiter::new())
        }
    };

    let email = create_email_service(&config.email);
    let cleanup = Arc::new(repositories.cleanup_service(CleanupConfig::default()));
    let state = AppState::build(config, &repositories, email, rate_limiter, probes);

    Ok((state, cleanup))
}
