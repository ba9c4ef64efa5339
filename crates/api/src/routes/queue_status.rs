//! Queue status routes — observe the foreign runtime's queue.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use courier_common::error::AppError;
use courier_common::types::{JobState, JobSummary, QueueStatusSnapshot};

use crate::state::AppState;

/// Default number of jobs returned by the extended view.
const DEFAULT_SAMPLE_LIMIT: usize = 20;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/queue-status", get(queue_status))
        .route("/queue-status/jobs", get(queue_jobs))
}

/// GET /queue-status — aggregate job counts for the monitored queue.
async fn queue_status(
    State(state): State<AppState>,
) -> Result<Json<QueueStatusSnapshot>, AppError> {
    let snapshot = state
        .monitor
        .get_status(&state.config.monitor_queue)
        .await?;
    Ok(Json(snapshot))
}

#[derive(Debug, Deserialize)]
struct JobsQuery {
    state: JobState,
    limit: Option<usize>,
}

/// GET /queue-status/jobs?state=failed&limit=20 — bounded metadata sample.
///
/// Payloads on the monitored queue come from a producer whose encoding this
/// runtime cannot decode, so the sample carries id/name/state only.
async fn queue_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobsQuery>,
) -> Result<Json<Vec<JobSummary>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_SAMPLE_LIMIT);
    let jobs = state
        .monitor
        .sample_jobs(&state.config.monitor_queue, query.state, limit)
        .await?;
    Ok(Json(jobs))
}
