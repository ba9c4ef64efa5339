//! Async queue client over a shared Redis transport.

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};

use courier_common::error::AppError;
use courier_common::types::{JobCounts, JobState, JobSummary};

use crate::keys::QueueKeys;

/// Upper bound on jobs returned by a single [`QueueClient::sample_jobs`] call.
const MAX_SAMPLE: usize = 100;

/// Backoff strategy names understood by the worker fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    Exponential,
    Fixed,
}

/// Backoff settings serialized into the job's `opts` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffOptions {
    #[serde(rename = "type")]
    pub kind: BackoffKind,
    /// Initial delay in milliseconds
    pub delay: u64,
}

/// Attempt policy attached to a job at enqueue time. The worker applies it;
/// this runtime only records it on the job hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOptions {
    pub attempts: u32,
    pub backoff: BackoffOptions,
}

impl JobOptions {
    /// Policy with `attempts` tries and exponential backoff from `delay` ms.
    pub fn exponential(attempts: u32, delay: u64) -> Self {
        Self {
            attempts,
            backoff: BackoffOptions {
                kind: BackoffKind::Exponential,
                delay,
            },
        }
    }
}

/// One standing repeatable job definition, stored as a JSON member of the
/// queue's `repeat` sorted set. Serialization is deterministic for a given
/// `(name, id, every)`, so registering the same definition twice converges
/// on a single registry member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatableJob {
    pub name: String,
    /// Fixed id, conventionally `"{name}-schedule"`
    pub id: String,
    /// Interval between materialized runs, in milliseconds
    pub every: u64,
}

/// Client for one named queue on the shared transport.
///
/// Constructed explicitly at startup and cloned into components; the
/// underlying [`ConnectionManager`] multiplexes a single connection.
#[derive(Clone)]
pub struct QueueClient {
    conn: ConnectionManager,
    keys: QueueKeys,
    name: String,
}

impl QueueClient {
    pub fn new(conn: ConnectionManager, prefix: &str, queue: &str) -> Self {
        Self {
            conn,
            keys: QueueKeys::new(prefix, queue),
            name: queue.to_string(),
        }
    }

    /// Name of the queue this client addresses.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Durably persist a job and push it onto the wait list.
    ///
    /// Idempotent per `job_id`: the id is claimed with `HSETNX` before
    /// anything is written, so a second add with the same id is a no-op.
    /// Returns `true` if the job was queued, `false` if the id was already
    /// present.
    pub async fn add_job(
        &self,
        name: &str,
        job_id: &str,
        data: &serde_json::Value,
        opts: &JobOptions,
    ) -> Result<bool, AppError> {
        let mut conn = self.conn.clone();
        let job_key = self.keys.job(job_id);

        let claimed: bool = redis::cmd("HSETNX")
            .arg(&job_key)
            .arg("id")
            .arg(job_id)
            .query_async(&mut conn)
            .await?;

        if !claimed {
            tracing::debug!(
                queue = %self.name,
                job_id,
                "Job id already present on transport, add skipped"
            );
            return Ok(false);
        }

        let opts_json = serde_json::to_string(opts)
            .map_err(|e| AppError::Internal(format!("Failed to encode job options: {}", e)))?;
        let enqueued_at = chrono::Utc::now().timestamp_millis();

        let _: () = redis::pipe()
            .atomic()
            .cmd("HSET")
            .arg(&job_key)
            .arg("name")
            .arg(name)
            .arg("data")
            .arg(data.to_string())
            .arg("opts")
            .arg(opts_json)
            .arg("timestamp")
            .arg(enqueued_at)
            .ignore()
            .cmd("LPUSH")
            .arg(self.keys.wait())
            .arg(job_id)
            .ignore()
            .query_async(&mut conn)
            .await?;

        tracing::debug!(queue = %self.name, job_id, job_name = name, "Job enqueued");
        Ok(true)
    }

    /// Aggregate per-state job counts for this queue.
    ///
    /// Reads list lengths and sorted-set cardinalities only; job payloads
    /// are never touched, so this works on queues populated by a foreign
    /// runtime with an incompatible job encoding.
    pub async fn job_counts(&self) -> Result<JobCounts, AppError> {
        let mut conn = self.conn.clone();

        let (waiting, active, completed, failed, delayed, paused): (u64, u64, u64, u64, u64, u64) =
            redis::pipe()
                .llen(self.keys.wait())
                .llen(self.keys.active())
                .zcard(self.keys.completed())
                .zcard(self.keys.failed())
                .zcard(self.keys.delayed())
                .llen(self.keys.paused())
                .query_async(&mut conn)
                .await?;

        Ok(JobCounts {
            waiting,
            active,
            completed,
            failed,
            delayed,
            paused,
        })
    }

    /// List the repeatable job definitions registered for this queue.
    ///
    /// Registry members written by older fleet versions may not parse;
    /// those are skipped with a warning rather than failing the listing.
    pub async fn list_repeatable_jobs(&self) -> Result<Vec<RepeatableJob>, AppError> {
        let mut conn = self.conn.clone();
        let members: Vec<String> = conn.zrange(self.keys.repeat(), 0, -1).await?;

        let mut jobs = Vec::with_capacity(members.len());
        for member in members {
            match serde_json::from_str::<RepeatableJob>(&member) {
                Ok(job) => jobs.push(job),
                Err(err) => {
                    tracing::warn!(
                        queue = %self.name,
                        member,
                        %err,
                        "Skipping unparseable repeatable job registry entry"
                    );
                }
            }
        }

        Ok(jobs)
    }

    /// Register a repeatable job definition.
    ///
    /// Uses `ZADD NX` with the first materialization time as score: an
    /// already-registered definition is left untouched, so concurrent
    /// registrations of the same definition are harmless.
    pub async fn add_repeatable_job(&self, job: &RepeatableJob) -> Result<(), AppError> {
        let member = serde_json::to_string(job).map_err(|e| {
            AppError::Internal(format!("Failed to encode repeatable job: {}", e))
        })?;
        let next_run = chrono::Utc::now().timestamp_millis() + job.every as i64;

        let mut conn = self.conn.clone();
        let _: () = redis::cmd("ZADD")
            .arg(self.keys.repeat())
            .arg("NX")
            .arg(next_run)
            .arg(member)
            .query_async(&mut conn)
            .await?;

        tracing::info!(
            queue = %self.name,
            job_name = %job.name,
            job_id = %job.id,
            every_ms = job.every,
            "Repeatable job registered"
        );
        Ok(())
    }

    /// Bounded sample of jobs in one state, metadata only.
    ///
    /// Returns at most `limit` (capped at 100) entries of `id` / `name` /
    /// state. The job `data` field is never read: payloads on shared queues
    /// may come from a producer whose encoding this runtime cannot decode.
    pub async fn sample_jobs(
        &self,
        state: JobState,
        limit: usize,
    ) -> Result<Vec<JobSummary>, AppError> {
        let limit = limit.min(MAX_SAMPLE);
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut conn = self.conn.clone();
        let key = self.keys.state(state);
        let stop = (limit - 1) as isize;

        let ids: Vec<String> = match state {
            JobState::Waiting | JobState::Active | JobState::Paused => {
                conn.lrange(key, 0, stop).await?
            }
            JobState::Delayed | JobState::Completed | JobState::Failed => {
                conn.zrange(key, 0, stop).await?
            }
        };

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for id in &ids {
            pipe.cmd("HGET").arg(self.keys.job(id)).arg("name");
        }
        let names: Vec<Option<String>> = pipe.query_async(&mut conn).await?;

        Ok(ids
            .into_iter()
            .zip(names)
            .map(|(id, name)| JobSummary { id, name, state })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_options_wire_shape() {
        let opts = JobOptions::exponential(3, 1000);
        let json = serde_json::to_string(&opts).unwrap();
        assert_eq!(
            json,
            r#"{"attempts":3,"backoff":{"type":"exponential","delay":1000}}"#
        );
    }

    #[test]
    fn test_repeatable_job_round_trip() {
        let job = RepeatableJob {
            name: "cleanupTimedOutMatches".to_string(),
            id: "cleanupTimedOutMatches-schedule".to_string(),
            every: 3_600_000,
        };
        let member = serde_json::to_string(&job).unwrap();
        let parsed: RepeatableJob = serde_json::from_str(&member).unwrap();
        assert_eq!(parsed, job);
    }

    #[test]
    fn test_repeatable_member_is_deterministic() {
        let job = RepeatableJob {
            name: "cleanupTimedOutMatches".to_string(),
            id: "cleanupTimedOutMatches-schedule".to_string(),
            every: 3_600_000,
        };
        assert_eq!(
            serde_json::to_string(&job).unwrap(),
            serde_json::to_string(&job.clone()).unwrap()
        );
    }

    #[test]
    fn test_malformed_registry_member_does_not_parse() {
        // Mirrors the skip branch in list_repeatable_jobs
        assert!(serde_json::from_str::<RepeatableJob>("cleanup:hourly").is_err());
        assert!(serde_json::from_str::<RepeatableJob>(r#"{"name":"x"}"#).is_err());
    }
}
