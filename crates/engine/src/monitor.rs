//! Cross-runtime queue monitor — read-only, schema-agnostic status views.
//!
//! The observed queue is populated by a separate runtime whose job encoding
//! this process cannot decode. The monitor therefore reports transport-level
//! metadata only: aggregate counts, and bounded `id`/`name`/state samples.
//! It connects with this runtime's own connection parameters, which may
//! differ from the producer's even though both address the same queue name.

use redis::aio::ConnectionManager;

use courier_common::error::AppError;
use courier_common::types::{JobState, JobSummary, QueueStatusSnapshot};
use courier_queue::QueueClient;

pub struct QueueMonitor {
    conn: ConnectionManager,
    prefix: String,
}

impl QueueMonitor {
    pub fn new(conn: ConnectionManager, prefix: &str) -> Self {
        Self {
            conn,
            prefix: prefix.to_string(),
        }
    }

    fn client(&self, queue_name: &str) -> QueueClient {
        QueueClient::new(self.conn.clone(), &self.prefix, queue_name)
    }

    /// Aggregate job-state counts for `queue_name`.
    ///
    /// Transport failures are reported as [`AppError::Monitor`] with the
    /// cause; there is no internal retry. The caller's polling loop decides
    /// whether to try again.
    pub async fn get_status(&self, queue_name: &str) -> Result<QueueStatusSnapshot, AppError> {
        let counts = self
            .client(queue_name)
            .job_counts()
            .await
            .map_err(|e| AppError::Monitor(e.to_string()))?;

        Ok(QueueStatusSnapshot {
            name: queue_name.to_string(),
            counts,
        })
    }

    /// Bounded metadata sample of jobs in one state. Tolerates payloads of
    /// any shape because it never reads them.
    pub async fn sample_jobs(
        &self,
        queue_name: &str,
        state: JobState,
        limit: usize,
    ) -> Result<Vec<JobSummary>, AppError> {
        self.client(queue_name)
            .sample_jobs(state, limit)
            .await
            .map_err(|e| AppError::Monitor(e.to_string()))
    }
}
