use serde::Deserialize;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// PostgreSQL connection string
    pub database_url: String,

    /// Queue transport host for this runtime's own connection (default: 127.0.0.1)
    pub queue_redis_host: String,

    /// Queue transport port for this runtime's own connection (default: 6379)
    pub queue_redis_port: u16,

    /// Key namespace shared with the worker fleet (default: "bull")
    pub queue_prefix: String,

    /// Queue this runtime enqueues notification jobs into (default: "notifications")
    pub notification_queue: String,

    /// Foreign queue observed by the status monitor (default: "matching").
    /// Populated by a separate runtime whose job encoding we never decode.
    pub monitor_queue: String,

    /// Repeat interval for the timed-out-match cleanup job in milliseconds
    /// (default: 3600000 = hourly)
    pub cleanup_interval_ms: u64,

    /// Maximum number of PostgreSQL connections in the pool (default: 20)
    pub db_max_connections: u32,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?,
            queue_redis_host: std::env::var("QUEUE_REDIS_HOST")
                .unwrap_or_else(|_| "127.0.0.1".to_string()),
            queue_redis_port: std::env::var("QUEUE_REDIS_PORT")
                .unwrap_or_else(|_| "6379".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("QUEUE_REDIS_PORT must be a valid u16"))?,
            queue_prefix: std::env::var("QUEUE_PREFIX").unwrap_or_else(|_| "bull".to_string()),
            notification_queue: std::env::var("NOTIFICATION_QUEUE")
                .unwrap_or_else(|_| "notifications".to_string()),
            monitor_queue: std::env::var("MONITOR_QUEUE")
                .unwrap_or_else(|_| "matching".to_string()),
            cleanup_interval_ms: std::env::var("CLEANUP_INTERVAL_MS")
                .unwrap_or_else(|_| "3600000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("CLEANUP_INTERVAL_MS must be a valid u64"))?,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a valid u32"))?,
        })
    }

    /// Redis connection URL for this runtime's queue transport connection.
    ///
    /// The foreign worker runtime resolves its own host/port from its own
    /// environment; both address the same logical queue names.
    pub fn queue_redis_url(&self) -> String {
        format!("redis://{}:{}", self.queue_redis_host, self.queue_redis_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config() -> AppConfig {
        AppConfig {
            database_url: "unused".to_string(),
            queue_redis_host: "10.0.0.5".to_string(),
            queue_redis_port: 6380,
            queue_prefix: "bull".to_string(),
            notification_queue: "notifications".to_string(),
            monitor_queue: "matching".to_string(),
            cleanup_interval_ms: 3_600_000,
            db_max_connections: 20,
        }
    }

    #[test]
    fn test_queue_redis_url_format() {
        assert_eq!(make_config().queue_redis_url(), "redis://10.0.0.5:6380");
    }
}
