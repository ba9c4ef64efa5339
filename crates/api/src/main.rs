//! Match Courier API server binary entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use courier_common::config::AppConfig;
use courier_common::db::create_pool;
use courier_common::redis_pool::create_redis_pool;
use courier_engine::dispatcher::NotificationDispatcher;
use courier_engine::monitor::QueueMonitor;
use courier_engine::scheduler::{CLEANUP_JOB_NAME, CleanupScheduler};
use courier_queue::QueueClient;

use courier_api::routes::create_router;
use courier_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("courier_api=debug,courier_engine=debug,courier_queue=debug,tower_http=debug")
        }))
        .init();

    tracing::info!("Starting Match Courier API server...");

    // Load configuration
    let config = AppConfig::from_env()?;

    // Create database connection pool
    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    tracing::info!("Database pool created");

    // Connect to the queue transport with this runtime's own parameters
    let redis = create_redis_pool(&config.queue_redis_url()).await?;
    tracing::info!("Queue transport connection established");

    // Queue-facing components, injected into route handlers via state
    let queue = QueueClient::new(
        redis.clone(),
        &config.queue_prefix,
        &config.notification_queue,
    );
    let monitor = QueueMonitor::new(redis, &config.queue_prefix);

    // Re-assert the cleanup schedule. Absence of the schedule is degraded
    // but not fatal, so a failure here does not stop startup.
    if let Err(err) =
        CleanupScheduler::ensure_scheduled(&queue, CLEANUP_JOB_NAME, config.cleanup_interval_ms)
            .await
    {
        tracing::error!(%err, "Cleanup schedule registration failed; continuing without it");
    }

    let dispatcher = NotificationDispatcher::new(queue);

    // Build application state
    let state = AppState::new(pool, Arc::new(dispatcher), Arc::new(monitor), config);

    // Build router
    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
