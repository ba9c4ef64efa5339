use redis::Client;
use redis::aio::ConnectionManager;

/// Create a Redis connection manager for async queue transport operations.
///
/// The returned handle is cheap to clone; every component that talks to the
/// queue transport receives a clone rather than a process-wide singleton.
pub async fn create_redis_pool(redis_url: &str) -> anyhow::Result<ConnectionManager> {
    let client = Client::open(redis_url)?;
    let manager = ConnectionManager::new(client).await?;

    tracing::info!("Connected to Redis");
    Ok(manager)
}
