//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration shared by the client and server roles.
///
/// All values have defaults; `from_env` overrides them from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote status service.
    pub base_url: String,
    /// Path to the persisted id collection (flat JSON array).
    pub ids_file: PathBuf,
    /// Delay between loader scans of the id collection.
    pub retry_delay: Duration,
    /// Worker idle sleep when the queue is empty.
    pub queue_poll_interval: Duration,
    /// Client-side bound on a repeated status poll.
    pub client_polling_timeout: Duration,
    /// Server-side bound on a long-poll request.
    pub server_polling_timeout: Duration,
    /// Step between consecutive checks inside a bounded poll (both sides).
    pub poll_step: Duration,
    /// Elapsed time after first observation before a job turns terminal.
    pub completion_window: Duration,
    /// Server bind address.
    pub bind_addr: String,
    /// Cap on concurrently blocked long-poll requests.
    pub max_concurrent_polls: usize,
    /// Directory for role log files.
    pub log_directory: PathBuf,
    /// Server log file name.
    pub server_log_file: String,
    /// Client log file name.
    pub client_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            ids_file: PathBuf::from("client/ids.json"),
            retry_delay: Duration::from_secs(5),
            queue_poll_interval: Duration::from_secs(1),
            client_polling_timeout: Duration::from_secs(5),
            server_polling_timeout: Duration::from_secs(5),
            poll_step: Duration::from_secs(1),
            completion_window: Duration::from_secs(10),
            bind_addr: "127.0.0.1:5000".to_string(),
            max_concurrent_polls: 64,
            log_directory: PathBuf::from("./logs"),
            server_log_file: "server.log".to_string(),
            client_log_file: "client.log".to_string(),
        }
    }
}

fn env_secs(key: &str, default: Duration) -> Duration {
    match std::env::var(key) {
        Ok(raw) => match raw.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                tracing::warn!(key, value = %raw, "Ignoring non-numeric duration, using default");
                default
            }
        },
        Err(_) => default,
    }
}

impl Config {
    /// Build a config from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_concurrent_polls = std::env::var("MAX_CONCURRENT_POLLS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_concurrent_polls);

        Self {
            base_url: std::env::var("BASE_URL").unwrap_or(defaults.base_url),
            ids_file: std::env::var("IDS_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.ids_file),
            retry_delay: env_secs("RETRY_DELAY", defaults.retry_delay),
            queue_poll_interval: env_secs("QUEUE_POLL_INTERVAL", defaults.queue_poll_interval),
            client_polling_timeout: env_secs(
                "CLIENT_POLLING_TIMEOUT",
                defaults.client_polling_timeout,
            ),
            server_polling_timeout: env_secs(
                "SERVER_POLLING_TIMEOUT",
                defaults.server_polling_timeout,
            ),
            poll_step: env_secs("POLL_STEP", defaults.poll_step),
            completion_window: env_secs("COMPLETION_WINDOW", defaults.completion_window),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            max_concurrent_polls,
            log_directory: std::env::var("LOG_DIRECTORY")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_directory),
            server_log_file: std::env::var("SERVER_LOG_FILE").unwrap_or(defaults.server_log_file),
            client_log_file: std::env::var("CLIENT_LOG_FILE").unwrap_or(defaults.client_log_file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_environment() {
        let cfg = Config::default();
        assert_eq!(cfg.base_url, "http://127.0.0.1:5000");
        assert_eq!(cfg.retry_delay, Duration::from_secs(5));
        assert_eq!(cfg.completion_window, Duration::from_secs(10));
        assert_eq!(cfg.poll_step, Duration::from_secs(1));
    }

    #[test]
    fn non_numeric_duration_falls_back() {
        // SAFETY: no other test touches RETRY_DELAY concurrently.
        unsafe { std::env::set_var("RETRY_DELAY", "soon") };
        let cfg = Config::from_env();
        assert_eq!(cfg.retry_delay, Duration::from_secs(5));
        unsafe { std::env::remove_var("RETRY_DELAY") };
    }
}
