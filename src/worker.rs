//! Worker loop — drains the queue, asks the remote service for each id's
//! status, and persists the result.
//!
//! Failure handling is the retry mechanism: a transport failure demotes the
//! id to "not processed" so the next loader scan re-enqueues it. A bounded
//! poll that runs out of time persists "pending" for the same reason. The
//! loop itself never stops over a single id.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::client::{PollMode, PollOutcome, RemoteStatusClient};
use crate::queue::JobQueue;
use crate::store::{JobStatus, StatusStore};

/// Worker loop timing and polling bounds.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Idle sleep when the queue is empty.
    pub queue_poll_interval: Duration,
    /// Bound on one id's repeated status poll.
    pub polling_timeout: Duration,
}

/// Spawn the worker loop. Returns a `JoinHandle` and a shutdown flag.
pub fn spawn_worker(
    store: Arc<StatusStore>,
    queue: Arc<JobQueue>,
    client: Arc<RemoteStatusClient>,
    cfg: WorkerConfig,
) -> (JoinHandle<()>, Arc<AtomicBool>) {
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = Arc::clone(&shutdown);

    let handle = tokio::spawn(async move {
        info!("Worker started");

        loop {
            if shutdown.load(Ordering::Relaxed) {
                info!("Worker shutting down");
                return;
            }

            let Some(id) = queue.dequeue() else {
                tokio::time::sleep(cfg.queue_poll_interval).await;
                continue;
            };

            process_id(&store, &client, id, cfg.polling_timeout).await;
            queue.complete(id);
        }
    });

    (handle, shutdown_flag)
}

/// Poll one id and persist the outcome.
async fn process_id(
    store: &StatusStore,
    client: &RemoteStatusClient,
    id: i64,
    polling_timeout: Duration,
) {
    info!(id, "Processing id");

    match client.get_status(id, polling_timeout, PollMode::Bounded).await {
        Ok(PollOutcome::Terminal(status)) => {
            info!(id, status = %status, "Received terminal status");
            store.update_status(id, status).await;
        }
        Ok(PollOutcome::Pending) => {
            info!(id, "Still pending after poll window");
            store.update_status(id, JobStatus::Pending).await;
        }
        Err(e) => {
            error!(error = %e, id, "Status check failed, demoting id for retry");
            store.update_status(id, JobStatus::NotProcessed).await;
        }
    }
}
