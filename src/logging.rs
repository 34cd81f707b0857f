//! Tracing setup — one log file per role.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initialize tracing with a non-blocking file writer under `log_directory`.
///
/// The returned guard must stay alive for the process lifetime or buffered
/// log lines are dropped on exit.
pub fn init(log_directory: &Path, file_name: &str) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(log_directory)?;

    let appender = tracing_appender::rolling::never(log_directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .init();

    tracing::info!(
        "Logging started in {}",
        log_directory.join(file_name).display()
    );
    Ok(guard)
}
