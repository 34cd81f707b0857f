use std::sync::Arc;

use jobwatch::client::RemoteStatusClient;
use jobwatch::config::Config;
use jobwatch::loader::spawn_loader;
use jobwatch::queue::JobQueue;
use jobwatch::store::StatusStore;
use jobwatch::worker::{WorkerConfig, spawn_worker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::from_env();
    let _log_guard = jobwatch::logging::init(&cfg.log_directory, &cfg.client_log_file)?;

    tracing::info!("Client is starting...");

    let store = Arc::new(StatusStore::new(cfg.ids_file.clone()));
    let queue = Arc::new(JobQueue::new());
    let client = Arc::new(RemoteStatusClient::new(
        cfg.base_url.clone(),
        cfg.poll_step,
    ));

    let (loader_handle, _loader_shutdown) =
        spawn_loader(Arc::clone(&store), Arc::clone(&queue), cfg.retry_delay);
    let (worker_handle, _worker_shutdown) = spawn_worker(
        store,
        queue,
        client,
        WorkerConfig {
            queue_poll_interval: cfg.queue_poll_interval,
            polling_timeout: cfg.client_polling_timeout,
        },
    );

    // Both loops run until the process is killed.
    let (loader, worker) = tokio::join!(loader_handle, worker_handle);
    loader?;
    worker?;
    Ok(())
}
