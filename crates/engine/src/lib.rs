//! Core coordination logic: notification fan-out, the recurring cleanup
//! schedule, cross-runtime queue observation, and the potential-match cache.

pub mod dispatcher;
pub mod match_cache;
pub mod monitor;
pub mod scheduler;
