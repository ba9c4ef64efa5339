//! Notification dispatch route.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use courier_common::error::AppError;
use courier_engine::dispatcher::SendNotificationRequest;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/notifications/send", post(send_notification))
}

/// POST /notifications/send — fan a notification out to its recipients.
///
/// Returns 202 once every per-recipient job has been accepted by the queue
/// transport; delivery happens asynchronously in the worker fleet. The body
/// is decoded leniently so that shape errors (e.g. `recipientUserIds` not an
/// array) surface as the documented 400, not as a body-decode rejection.
async fn send_notification(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let request: SendNotificationRequest = serde_json::from_value(body)
        .map_err(|e| AppError::Validation(format!("malformed notification request: {}", e)))?;

    let receipt = state
        .dispatcher
        .dispatch(&request)
        .await
        .map_err(AppError::from)?;

    tracing::debug!(jobs = receipt.submitted.len(), "Dispatch accepted");

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "message": "Notification jobs enqueued." })),
    ))
}
