use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Common error types used across the application.
///
/// Every transport-boundary failure (Redis, Postgres) is translated into one
/// of these variants at the component that hit it; raw `redis::RedisError` /
/// `sqlx::Error` values never reach route handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Transport failure while submitting a job. Jobs already submitted by
    /// the same dispatch call are not retracted.
    #[error("Enqueue error: {0}")]
    Enqueue(String),

    /// Failure to list or register the repeatable cleanup job. Non-fatal:
    /// the process runs degraded without the schedule.
    #[error("Scheduler registration error: {0}")]
    Scheduler(String),

    /// Queue transport unavailable or count query failed while observing a
    /// queue. The caller decides whether to retry.
    #[error("Monitor error: {0}")]
    Monitor(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Database(_) | AppError::Redis(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "message": self.to_string() }),
            ),
            AppError::Enqueue(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "message": "Failed to enqueue notification jobs." }),
            ),
            AppError::Scheduler(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "message": msg }),
            ),
            AppError::Monitor(cause) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "message": "Failed to fetch queue status.", "error": cause }),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "message": msg })),
            AppError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Invalid request payload." }),
            ),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, json!({ "message": msg })),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_validation_maps_to_400() {
        let response = AppError::Validation("recipientUserIds is empty".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_enqueue_maps_to_500() {
        let response = AppError::Enqueue("connection reset".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_monitor_maps_to_500() {
        let response = AppError::Monitor("connection refused".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let response = AppError::NotFound("no cache entry".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
