//! Recurring cleanup scheduler — keeps exactly one standing schedule alive
//! for the timed-out-match cleanup task.
//!
//! Runs once per process lifetime at startup. The check-then-act sequence is
//! not mutually exclusive across process instances; the registry member is
//! deterministic for a given definition, so concurrent registrations
//! converge on a single entry at the transport.

use courier_common::error::AppError;
use courier_queue::{QueueClient, RepeatableJob};

/// Name of the maintenance task the worker fleet executes.
pub const CLEANUP_JOB_NAME: &str = "cleanupTimedOutMatches";

pub struct CleanupScheduler;

impl CleanupScheduler {
    /// Fixed repeatable-job id: `{jobName}-schedule`. Part of the on-wire
    /// contract with the worker fleet.
    pub fn schedule_job_id(job_name: &str) -> String {
        format!("{}-schedule", job_name)
    }

    /// Ensure a repeatable definition named `job_name` exists, registering
    /// one with the given interval if absent.
    ///
    /// Failure leaves the process degraded but running: callers log the
    /// error and continue startup.
    pub async fn ensure_scheduled(
        queue: &QueueClient,
        job_name: &str,
        every_ms: u64,
    ) -> Result<(), AppError> {
        let existing = queue
            .list_repeatable_jobs()
            .await
            .map_err(|e| AppError::Scheduler(format!("Failed to list repeatable jobs: {}", e)))?;

        if existing.iter().any(|job| job.name == job_name) {
            tracing::debug!(job_name, "Repeatable job already registered");
            return Ok(());
        }

        let definition = RepeatableJob {
            name: job_name.to_string(),
            id: Self::schedule_job_id(job_name),
            every: every_ms,
        };

        queue
            .add_repeatable_job(&definition)
            .await
            .map_err(|e| AppError::Scheduler(format!("Failed to register repeatable job: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_job_id_format() {
        assert_eq!(
            CleanupScheduler::schedule_job_id(CLEANUP_JOB_NAME),
            "cleanupTimedOutMatches-schedule"
        );
    }
}
