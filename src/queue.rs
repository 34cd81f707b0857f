//! In-process FIFO of ids awaiting a status check.
//!
//! The loader re-scans the whole file every cycle, so without bookkeeping a
//! still-pending id would be enqueued again on every scan. The queue keeps an
//! in-flight set: an id is admitted once and stays blocked until the worker
//! calls `complete` after persisting a result, at which point the next scan
//! may re-admit it.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use tracing::debug;

/// FIFO of pending ids with in-flight deduplication.
pub struct JobQueue {
    inner: Mutex<Inner>,
}

struct Inner {
    fifo: VecDeque<i64>,
    in_flight: HashSet<i64>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                fifo: VecDeque::new(),
                in_flight: HashSet::new(),
            }),
        }
    }

    /// Admit an id unless it is already queued or being processed.
    /// Never blocks. Returns whether the id was admitted.
    pub fn enqueue(&self, id: i64) -> bool {
        let mut inner = self.inner.lock().expect("queue lock poisoned");
        if !inner.in_flight.insert(id) {
            debug!(id, "Id already in flight, not re-enqueueing");
            return false;
        }
        inner.fifo.push_back(id);
        true
    }

    /// Pop the oldest id, leaving it marked in-flight. Non-blocking.
    pub fn dequeue(&self) -> Option<i64> {
        let mut inner = self.inner.lock().expect("queue lock poisoned");
        inner.fifo.pop_front()
    }

    /// Release an id after its result was persisted so a later loader scan
    /// can admit it again.
    pub fn complete(&self, id: i64) {
        let mut inner = self.inner.lock().expect("queue lock poisoned");
        inner.in_flight.remove(&id);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("queue lock poisoned").fifo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order() {
        let queue = JobQueue::new();
        queue.enqueue(1);
        queue.enqueue(2);
        queue.enqueue(3);
        assert_eq!(queue.dequeue(), Some(1));
        assert_eq!(queue.dequeue(), Some(2));
        assert_eq!(queue.dequeue(), Some(3));
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn duplicate_enqueue_is_rejected_while_in_flight() {
        let queue = JobQueue::new();
        assert!(queue.enqueue(7));
        assert!(!queue.enqueue(7));
        assert_eq!(queue.len(), 1);

        // Still in flight after dequeue, until completed.
        assert_eq!(queue.dequeue(), Some(7));
        assert!(!queue.enqueue(7));

        queue.complete(7);
        assert!(queue.enqueue(7));
    }

    #[test]
    fn dequeue_on_empty_returns_none() {
        let queue = JobQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.dequeue(), None);
    }
}
