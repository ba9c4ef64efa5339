use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// States a queued job moves through on the transport.
///
/// `waiting → active → (completed | failed)`; a failed attempt re-enters
/// `waiting` through `delayed` until the attempt budget is exhausted.
/// `paused` holds jobs for a queue an operator has paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Waiting,
    Active,
    Completed,
    Failed,
    Delayed,
    Paused,
}

impl JobState {
    /// All states reported by a queue status snapshot, in wire order.
    pub const ALL: [JobState; 6] = [
        JobState::Waiting,
        JobState::Active,
        JobState::Completed,
        JobState::Failed,
        JobState::Delayed,
        JobState::Paused,
    ];
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Waiting => write!(f, "waiting"),
            JobState::Active => write!(f, "active"),
            JobState::Completed => write!(f, "completed"),
            JobState::Failed => write!(f, "failed"),
            JobState::Delayed => write!(f, "delayed"),
            JobState::Paused => write!(f, "paused"),
        }
    }
}

/// Aggregate per-state job counts for one queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCounts {
    pub waiting: u64,
    pub active: u64,
    pub completed: u64,
    pub failed: u64,
    pub delayed: u64,
    pub paused: u64,
}

/// Point-in-time view of a queue's aggregate state. Never persisted;
/// recomputed on every monitor invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueStatusSnapshot {
    /// Queue name being observed
    pub name: String,
    /// Mapping from job state to a non-negative count
    pub counts: JobCounts,
}

/// Transport-level metadata for a single job, used by the monitor's
/// extended views. Deliberately excludes the payload: the producing
/// runtime's job encoding is not decodable here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: String,
    /// Job name as registered by the producer, if present on the hash
    pub name: Option<String>,
    pub state: JobState,
}

/// Payload carried by each per-recipient notification job, stored verbatim
/// in the job's `data` field. Field names are part of the on-wire contract
/// with the worker fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationJobPayload {
    pub user_id: String,
    pub message_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// One scored candidate in a resource's potential-match list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotentialMatch {
    pub matched_resource_id: Uuid,
    /// Higher = better match
    pub score: f64,
    /// Opaque auxiliary payload computed by the matching engine
    #[serde(default)]
    pub cached_data: serde_json::Value,
}

/// Cached candidate-match list for one resource. Exactly one row per
/// `resource_id`; the list is fully replaced on recomputation.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PotentialMatchCacheEntry {
    pub resource_id: Uuid,
    pub potential_matches: sqlx::types::Json<Vec<PotentialMatch>>,
    pub last_cache_update: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_state_display_matches_wire_names() {
        let rendered: Vec<String> = JobState::ALL.iter().map(|s| s.to_string()).collect();
        assert_eq!(
            rendered,
            vec!["waiting", "active", "completed", "failed", "delayed", "paused"]
        );
    }

    #[test]
    fn test_job_state_deserializes_lowercase() {
        let state: JobState = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(state, JobState::Failed);
    }

    #[test]
    fn test_notification_payload_uses_camel_case() {
        let payload = NotificationJobPayload {
            user_id: "u1".to_string(),
            message_key: "match_found".to_string(),
            data: Some(serde_json::json!({"matchId": "m1"})),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["messageKey"], "match_found");
        assert_eq!(value["data"]["matchId"], "m1");
    }

    #[test]
    fn test_notification_payload_omits_absent_data() {
        let payload = NotificationJobPayload {
            user_id: "u1".to_string(),
            message_key: "match_found".to_string(),
            data: None,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("data").is_none());
    }

    #[test]
    fn test_potential_match_wire_shape() {
        let m = PotentialMatch {
            matched_resource_id: Uuid::new_v4(),
            score: 0.87,
            cached_data: serde_json::json!({"distanceKm": 12}),
        };
        let value = serde_json::to_value(&m).unwrap();
        assert!(value.get("matchedResourceId").is_some());
        assert_eq!(value["score"], 0.87);
        assert_eq!(value["cachedData"]["distanceKm"], 12);
    }
}
