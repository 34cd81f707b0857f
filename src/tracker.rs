//! Per-id status tracker — the server's authoritative state.
//!
//! The first query for an id pins its observation time; the derived status
//! is a pure function of elapsed time and, after the completion window, of
//! the id itself via a pluggable rule.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::store::JobStatus;

/// Decides the terminal status of a job once its completion window elapses.
///
/// The decision must be deterministic per id; the tracker relies on that for
/// idempotence. The parity rule is a stand-in for a real backend check.
pub trait CompletionRule: Send + Sync {
    fn decide(&self, id: i64) -> JobStatus;
}

/// Reference rule: even ids complete, odd ids fail.
pub struct ParityRule;

impl CompletionRule for ParityRule {
    fn decide(&self, id: i64) -> JobStatus {
        if id % 2 == 0 {
            JobStatus::Completed
        } else {
            JobStatus::Error
        }
    }
}

/// Tracks first observation per id and derives the current status.
///
/// Entries live for the process lifetime; there is no eviction.
pub struct StatusTracker {
    first_seen: Mutex<HashMap<i64, Instant>>,
    window: Duration,
    rule: Box<dyn CompletionRule>,
}

impl StatusTracker {
    pub fn new(window: Duration, rule: Box<dyn CompletionRule>) -> Self {
        Self {
            first_seen: Mutex::new(HashMap::new()),
            window,
            rule,
        }
    }

    /// Current status of `id`, recording the observation time on first call.
    ///
    /// First observation is exactly-once: the map entry is created under the
    /// lock and never overwritten, so concurrent first requests agree on the
    /// timestamp and the terminal decision never flips back.
    pub fn get_status(&self, id: i64) -> JobStatus {
        let elapsed = {
            let mut map = self.first_seen.lock().expect("tracker lock poisoned");
            map.entry(id).or_insert_with(Instant::now).elapsed()
        };

        if elapsed < self.window {
            debug!(id, ?elapsed, "Id still inside completion window");
            JobStatus::Pending
        } else {
            self.rule.decide(id)
        }
    }
}
