//! Background loader — periodically scans the id collection and feeds the
//! queue with ids that still need a terminal result.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::queue::JobQueue;
use crate::store::StatusStore;

/// Spawn the loader loop.
///
/// Returns a `JoinHandle` and a shutdown flag. The loop never exits on its
/// own: a failed scan is logged inside the store and simply yields nothing,
/// and the next tick retries.
pub fn spawn_loader(
    store: Arc<StatusStore>,
    queue: Arc<JobQueue>,
    retry_delay: Duration,
) -> (JoinHandle<()>, Arc<AtomicBool>) {
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = Arc::clone(&shutdown);

    let handle = tokio::spawn(async move {
        info!("Loader started, scanning every {:?}", retry_delay);

        let mut tick = tokio::time::interval(retry_delay);

        loop {
            tick.tick().await;

            if shutdown.load(Ordering::Relaxed) {
                info!("Loader shutting down");
                return;
            }

            let ids = store.load_pending().await;
            if ids.is_empty() {
                continue;
            }

            let mut admitted = 0usize;
            for id in ids {
                if queue.enqueue(id) {
                    admitted += 1;
                }
            }
            if admitted > 0 {
                debug!(admitted, "Enqueued unprocessed ids");
            }
        }
    });

    (handle, shutdown_flag)
}
