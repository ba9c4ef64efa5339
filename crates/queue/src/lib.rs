//! Queue Client — thin wrapper over the Redis-backed job queue transport.
//!
//! Speaks the key layout of the existing worker fleet so that jobs enqueued
//! here are picked up by workers this repository does not contain:
//!
//! - `{prefix}:{queue}:wait` / `active` / `paused` — lists of job ids
//! - `{prefix}:{queue}:delayed` / `completed` / `failed` — sorted sets
//! - `{prefix}:{queue}:repeat` — repeatable job registry
//! - `{prefix}:{queue}:{jobId}` — per-job hash (`id`, `name`, `data`, `opts`, `timestamp`)
//!
//! The client never interprets job `data` it did not write; status views are
//! computed from key-level metadata only.

pub mod client;
pub mod keys;

pub use client::{BackoffKind, BackoffOptions, JobOptions, QueueClient, RepeatableJob};
pub use keys::QueueKeys;
