//! Shared application state for the Axum API server.

use std::sync::Arc;

use sqlx::PgPool;

use courier_common::config::AppConfig;
use courier_engine::dispatcher::NotificationDispatcher;
use courier_engine::monitor::QueueMonitor;

/// Application state shared across all route handlers via Axum `State`.
///
/// The queue-facing components are constructed once at startup and injected
/// here; handlers never open their own transport connections.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub monitor: Arc<QueueMonitor>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        dispatcher: Arc<NotificationDispatcher>,
        monitor: Arc<QueueMonitor>,
        config: AppConfig,
    ) -> Self {
        Self {
            pool,
            dispatcher,
            monitor,
            config,
        }
    }
}
