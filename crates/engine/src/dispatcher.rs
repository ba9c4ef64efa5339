//! Notification dispatcher — validates one inbound request and fans it out
//! into independent per-recipient jobs on the notification queue.
//!
//! Delivery itself happens in the worker fleet; a successful dispatch only
//! means every job was accepted by the queue transport. There is no rollback:
//! if the transport fails at recipient N, jobs for recipients 1..N stay
//! queued and the error carries the partial receipt.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use courier_common::error::AppError;
use courier_common::types::NotificationJobPayload;
use courier_queue::{JobOptions, QueueClient};

/// Job name consumed by the worker fleet.
pub const NOTIFICATION_JOB_NAME: &str = "sendNotification";

/// Attempt budget attached to every notification job.
const MAX_ATTEMPTS: u32 = 3;

/// Initial backoff delay in milliseconds; subsequent delays grow exponentially.
const BACKOFF_DELAY_MS: u64 = 1000;

/// Inbound notification request, as posted to `/notifications/send`.
///
/// All fields are `Option` so that missing or null fields deserialize and
/// are rejected by [`NotificationDispatcher::prepare`] with the documented
/// validation error instead of a body-decode failure. Duplicate recipient
/// ids are forwarded as-is; the transport's per-job-id dedupe makes the
/// second add a no-op.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SendNotificationRequest {
    pub recipient_user_ids: Option<Vec<String>>,
    pub message_key: Option<String>,
    /// Opaque payload forwarded verbatim to each job; a `matchId` member,
    /// when present, participates in job-id derivation.
    pub data: Option<serde_json::Value>,
}

/// One job ready for the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedJob {
    pub job_id: String,
    pub payload: NotificationJobPayload,
    pub opts: JobOptions,
}

/// A job the transport acknowledged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedJob {
    pub user_id: String,
    pub job_id: String,
}

/// Outcome of a fully successful dispatch: one acknowledged job per
/// recipient. A "queued" acknowledgment, not a delivery guarantee.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReceipt {
    pub submitted: Vec<QueuedJob>,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Malformed request; nothing was enqueued.
    #[error("invalid notification request: {0}")]
    Invalid(&'static str),

    /// Transport failure mid-fan-out. `submitted` lists the jobs that were
    /// already accepted and are NOT retracted.
    #[error("enqueue failed for recipient {recipient}: {source}")]
    Enqueue {
        submitted: Vec<QueuedJob>,
        recipient: String,
        #[source]
        source: AppError,
    },
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Invalid(msg) => AppError::Validation(msg.to_string()),
            DispatchError::Enqueue {
                submitted,
                recipient,
                source,
            } => AppError::Enqueue(format!(
                "recipient {} failed after {} jobs were queued: {}",
                recipient,
                submitted.len(),
                source
            )),
        }
    }
}

/// Source of the suffix appended to job ids, taken once per dispatch call
/// and shared by all of that call's per-recipient jobs.
///
/// Implementations document their uniqueness guarantee; none of them
/// deduplicate repeated top-level dispatch calls.
pub trait DispatchStamp: Send + Sync {
    fn next(&self) -> String;
}

/// Millisecond wall-clock stamp forced to be strictly increasing within the
/// process, so two dispatch calls landing in the same millisecond still get
/// distinct job ids. Stamps from concurrent processes can collide at
/// millisecond granularity, matching the fleet's existing id contract.
#[derive(Debug, Default)]
pub struct MonotonicStamp {
    last: AtomicI64,
}

impl DispatchStamp for MonotonicStamp {
    fn next(&self) -> String {
        let now = chrono::Utc::now().timestamp_millis();
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let next = now.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, next, Ordering::SeqCst, Ordering::Relaxed)
            {
                Ok(_) => return next.to_string(),
                Err(actual) => prev = actual,
            }
        }
    }
}

/// Fans validated requests out into per-recipient queue jobs.
pub struct NotificationDispatcher {
    queue: QueueClient,
    stamp: Arc<dyn DispatchStamp>,
}

impl NotificationDispatcher {
    pub fn new(queue: QueueClient) -> Self {
        Self::with_stamp(queue, Arc::new(MonotonicStamp::default()))
    }

    /// Construct with an explicit stamp source (tests use a fixed one).
    pub fn with_stamp(queue: QueueClient, stamp: Arc<dyn DispatchStamp>) -> Self {
        Self { queue, stamp }
    }

    /// Deterministic job id: `notify-{messageKey}-match-{matchId|none}-user-{userId}-{stamp}`.
    /// The format is part of the on-wire contract with the worker fleet.
    pub fn job_id(message_key: &str, match_id: Option<&str>, user_id: &str, stamp: &str) -> String {
        format!(
            "notify-{}-match-{}-user-{}-{}",
            message_key,
            match_id.unwrap_or("none"),
            user_id,
            stamp
        )
    }

    /// Validate a request and build its per-recipient jobs, in request order.
    ///
    /// Rejects a missing/empty recipient list or a missing/empty
    /// `messageKey`; `data` is opaque and unchecked beyond the `matchId`
    /// lookup for id derivation.
    pub fn prepare(
        request: &SendNotificationRequest,
        stamp: &str,
    ) -> Result<Vec<PreparedJob>, DispatchError> {
        let recipients = request
            .recipient_user_ids
            .as_deref()
            .filter(|ids| !ids.is_empty())
            .ok_or(DispatchError::Invalid(
                "recipientUserIds must be a non-empty array",
            ))?;

        let message_key = request
            .message_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(DispatchError::Invalid("messageKey is required"))?;

        let match_id = request
            .data
            .as_ref()
            .and_then(|data| data.get("matchId"))
            .and_then(|id| id.as_str());

        Ok(recipients
            .iter()
            .map(|user_id| PreparedJob {
                job_id: Self::job_id(message_key, match_id, user_id, stamp),
                payload: NotificationJobPayload {
                    user_id: user_id.clone(),
                    message_key: message_key.to_string(),
                    data: request.data.clone(),
                },
                opts: JobOptions::exponential(MAX_ATTEMPTS, BACKOFF_DELAY_MS),
            })
            .collect())
    }

    /// Fan a request out into one job per recipient.
    ///
    /// Jobs are submitted sequentially in request order; ordering between
    /// them carries no meaning once queued. On a transport error the loop
    /// aborts and the returned error carries the partial receipt.
    pub async fn dispatch(
        &self,
        request: &SendNotificationRequest,
    ) -> Result<DispatchReceipt, DispatchError> {
        let stamp = self.stamp.next();
        let jobs = Self::prepare(request, &stamp)?;

        let mut submitted = Vec::with_capacity(jobs.len());
        for job in jobs {
            let data = match serde_json::to_value(&job.payload) {
                Ok(value) => value,
                Err(err) => {
                    return Err(DispatchError::Enqueue {
                        submitted,
                        recipient: job.payload.user_id,
                        source: AppError::Internal(format!(
                            "Failed to encode job payload: {}",
                            err
                        )),
                    });
                }
            };

            match self
                .queue
                .add_job(NOTIFICATION_JOB_NAME, &job.job_id, &data, &job.opts)
                .await
            {
                Ok(queued) => {
                    if !queued {
                        // Duplicate recipient within this call; the first
                        // job with this id already covers them.
                        tracing::debug!(job_id = %job.job_id, "Duplicate job id, transport kept the original");
                    }
                    submitted.push(QueuedJob {
                        user_id: job.payload.user_id,
                        job_id: job.job_id,
                    });
                }
                Err(source) => {
                    tracing::warn!(
                        queue = self.queue.name(),
                        recipient = %job.payload.user_id,
                        already_queued = submitted.len(),
                        %source,
                        "Dispatch aborted mid-fan-out; earlier jobs remain queued"
                    );
                    return Err(DispatchError::Enqueue {
                        submitted,
                        recipient: job.payload.user_id,
                        source,
                    });
                }
            }
        }

        tracing::info!(
            queue = self.queue.name(),
            jobs = submitted.len(),
            "Notification jobs enqueued"
        );
        Ok(DispatchReceipt { submitted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(recipients: &[&str], message_key: Option<&str>, data: Option<serde_json::Value>) -> SendNotificationRequest {
        SendNotificationRequest {
            recipient_user_ids: Some(recipients.iter().map(|s| s.to_string()).collect()),
            message_key: message_key.map(|s| s.to_string()),
            data,
        }
    }

    #[test]
    fn test_job_id_with_match() {
        assert_eq!(
            NotificationDispatcher::job_id("match_found", Some("m1"), "u1", "1700000000000"),
            "notify-match_found-match-m1-user-u1-1700000000000"
        );
    }

    #[test]
    fn test_job_id_without_match() {
        assert_eq!(
            NotificationDispatcher::job_id("welcome", None, "u9", "42"),
            "notify-welcome-match-none-user-u9-42"
        );
    }

    #[test]
    fn test_prepare_builds_one_job_per_recipient() {
        let req = request(
            &["u1", "u2"],
            Some("match_found"),
            Some(serde_json::json!({"matchId": "m1"})),
        );
        let jobs = NotificationDispatcher::prepare(&req, "1700000000000").unwrap();

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].job_id, "notify-match_found-match-m1-user-u1-1700000000000");
        assert_eq!(jobs[1].job_id, "notify-match_found-match-m1-user-u2-1700000000000");
    }

    #[test]
    fn test_prepare_shares_message_key_and_data() {
        let data = serde_json::json!({"matchId": "m1", "score": 0.9});
        let req = request(&["u1", "u2", "u3"], Some("match_found"), Some(data.clone()));
        let jobs = NotificationDispatcher::prepare(&req, "7").unwrap();

        for (job, user_id) in jobs.iter().zip(["u1", "u2", "u3"]) {
            assert_eq!(job.payload.user_id, user_id);
            assert_eq!(job.payload.message_key, "match_found");
            assert_eq!(job.payload.data.as_ref(), Some(&data));
        }
    }

    #[test]
    fn test_prepare_attaches_fixed_attempt_policy() {
        let req = request(&["u1"], Some("match_found"), None);
        let jobs = NotificationDispatcher::prepare(&req, "7").unwrap();
        assert_eq!(
            serde_json::to_string(&jobs[0].opts).unwrap(),
            r#"{"attempts":3,"backoff":{"type":"exponential","delay":1000}}"#
        );
    }

    #[test]
    fn test_prepare_rejects_empty_recipients() {
        let req = request(&[], Some("match_found"), None);
        assert!(matches!(
            NotificationDispatcher::prepare(&req, "7"),
            Err(DispatchError::Invalid(_))
        ));
    }

    #[test]
    fn test_prepare_rejects_missing_recipients() {
        let req = SendNotificationRequest {
            recipient_user_ids: None,
            message_key: Some("match_found".to_string()),
            data: None,
        };
        assert!(matches!(
            NotificationDispatcher::prepare(&req, "7"),
            Err(DispatchError::Invalid(_))
        ));
    }

    #[test]
    fn test_prepare_rejects_missing_or_empty_message_key() {
        let missing = request(&["u1"], None, None);
        let empty = request(&["u1"], Some(""), None);
        assert!(matches!(
            NotificationDispatcher::prepare(&missing, "7"),
            Err(DispatchError::Invalid(_))
        ));
        assert!(matches!(
            NotificationDispatcher::prepare(&empty, "7"),
            Err(DispatchError::Invalid(_))
        ));
    }

    #[test]
    fn test_prepare_keeps_duplicate_recipients() {
        // Dedup happens at the transport (identical job id), not here
        let req = request(&["u1", "u1"], Some("match_found"), None);
        let jobs = NotificationDispatcher::prepare(&req, "7").unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].job_id, jobs[1].job_id);
    }

    #[test]
    fn test_match_id_non_string_falls_back_to_none() {
        let req = request(&["u1"], Some("match_found"), Some(serde_json::json!({"matchId": 42})));
        let jobs = NotificationDispatcher::prepare(&req, "7").unwrap();
        assert_eq!(jobs[0].job_id, "notify-match_found-match-none-user-u1-7");
    }

    #[test]
    fn test_validation_error_maps_to_400_variant() {
        let err: AppError = DispatchError::Invalid("messageKey is required").into();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_monotonic_stamp_strictly_increases() {
        let stamp = MonotonicStamp::default();
        let a: i64 = stamp.next().parse().unwrap();
        let b: i64 = stamp.next().parse().unwrap();
        let c: i64 = stamp.next().parse().unwrap();
        assert!(a < b && b < c);
    }
}
