//! Redis key layout shared with the worker fleet.
//!
//! Both runtimes address the same logical queue by name under a common
//! prefix; the layout below is the on-wire contract between them.

use courier_common::types::JobState;

/// Key builder for one `{prefix}:{queue}` namespace.
#[derive(Debug, Clone)]
pub struct QueueKeys {
    prefix: String,
    queue: String,
}

impl QueueKeys {
    pub fn new(prefix: &str, queue: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            queue: queue.to_string(),
        }
    }

    fn scoped(&self, suffix: &str) -> String {
        format!("{}:{}:{}", self.prefix, self.queue, suffix)
    }

    /// List of job ids waiting for a worker.
    pub fn wait(&self) -> String {
        self.scoped("wait")
    }

    /// List of job ids currently being processed.
    pub fn active(&self) -> String {
        self.scoped("active")
    }

    /// List of job ids held while the queue is paused.
    pub fn paused(&self) -> String {
        self.scoped("paused")
    }

    /// Sorted set of job ids scheduled for a later attempt (backoff).
    pub fn delayed(&self) -> String {
        self.scoped("delayed")
    }

    /// Sorted set of finished job ids.
    pub fn completed(&self) -> String {
        self.scoped("completed")
    }

    /// Sorted set of terminally failed job ids.
    pub fn failed(&self) -> String {
        self.scoped("failed")
    }

    /// Sorted set holding the repeatable job registry.
    pub fn repeat(&self) -> String {
        self.scoped("repeat")
    }

    /// Hash holding one job's transport record.
    pub fn job(&self, job_id: &str) -> String {
        self.scoped(job_id)
    }

    /// Backing key for a job state. `waiting` jobs live in the `wait` list.
    pub fn state(&self, state: JobState) -> String {
        match state {
            JobState::Waiting => self.wait(),
            JobState::Active => self.active(),
            JobState::Paused => self.paused(),
            JobState::Delayed => self.delayed(),
            JobState::Completed => self.completed(),
            JobState::Failed => self.failed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout_matches_fleet_contract() {
        let keys = QueueKeys::new("bull", "notifications");
        assert_eq!(keys.wait(), "bull:notifications:wait");
        assert_eq!(keys.active(), "bull:notifications:active");
        assert_eq!(keys.paused(), "bull:notifications:paused");
        assert_eq!(keys.delayed(), "bull:notifications:delayed");
        assert_eq!(keys.completed(), "bull:notifications:completed");
        assert_eq!(keys.failed(), "bull:notifications:failed");
        assert_eq!(keys.repeat(), "bull:notifications:repeat");
    }

    #[test]
    fn test_job_key_embeds_job_id() {
        let keys = QueueKeys::new("bull", "notifications");
        assert_eq!(
            keys.job("notify-match_found-match-m1-user-u1-1700000000000"),
            "bull:notifications:notify-match_found-match-m1-user-u1-1700000000000"
        );
    }

    #[test]
    fn test_waiting_state_maps_to_wait_list() {
        let keys = QueueKeys::new("bull", "matching");
        assert_eq!(keys.state(JobState::Waiting), "bull:matching:wait");
        assert_eq!(keys.state(JobState::Failed), "bull:matching:failed");
    }
}
