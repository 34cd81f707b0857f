//! Remote status client — single status checks and bounded repeated polls
//! against the status service.

use std::time::Duration;

use serde::Deserialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::store::JobStatus;

/// Outcome of a status check or a bounded poll.
///
/// Transport failures are not an outcome; they surface as `Err(ClientError)`
/// and retry policy belongs to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The job reached `completed` or `error`.
    Terminal(JobStatus),
    /// The job has not finished; a bounded poll that ran out of time also
    /// resolves here rather than as a failure.
    Pending,
}

/// How `get_status` treats a non-terminal response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollMode {
    /// Issue exactly one request and return its result.
    Once,
    /// Repeat the check at `poll_step` intervals until terminal or timeout.
    Bounded,
}

/// Validate an externally supplied job id. The typed API takes `i64`; this is
/// the boundary check for raw input such as CLI arguments.
pub fn parse_job_id(raw: &str) -> Result<i64, ClientError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ClientError::InvalidId {
            raw: raw.to_string(),
        })
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    result: String,
}

/// HTTP client for the remote status service.
pub struct RemoteStatusClient {
    base_url: String,
    poll_step: Duration,
    client: reqwest::Client,
}

impl RemoteStatusClient {
    pub fn new(base_url: impl Into<String>, poll_step: Duration) -> Self {
        let base_url = base_url.into();
        info!(base_url = %base_url, "Remote status client initialized");
        Self {
            base_url,
            poll_step,
            client: reqwest::Client::new(),
        }
    }

    /// One snapshot request: `GET {base}/{id}/status`.
    ///
    /// Transport failures and non-2xx responses propagate immediately — they
    /// are never folded into `Pending`.
    pub async fn check_once(&self, id: i64) -> Result<PollOutcome, ClientError> {
        let url = format!("{}/{}/status", self.base_url, id);
        let resp = self.client.get(&url).send().await?;

        let http_status = resp.status();
        if !http_status.is_success() {
            return Err(ClientError::BadStatus {
                id,
                status: http_status.as_u16(),
            });
        }

        let body: StatusResponse =
            resp.json()
                .await
                .map_err(|e| ClientError::UnexpectedResponse {
                    id,
                    reason: e.to_string(),
                })?;

        let status =
            JobStatus::parse(&body.result).ok_or_else(|| ClientError::UnexpectedResponse {
                id,
                reason: format!("unknown status {:?}", body.result),
            })?;

        if status.is_terminal() {
            Ok(PollOutcome::Terminal(status))
        } else {
            Ok(PollOutcome::Pending)
        }
    }

    /// Check the status of `id`, optionally repeating until terminal.
    ///
    /// In `Bounded` mode the check repeats every `poll_step` until a terminal
    /// status arrives or `timeout` elapses; running out of time resolves to
    /// `Pending`, never an error.
    pub async fn get_status(
        &self,
        id: i64,
        timeout: Duration,
        mode: PollMode,
    ) -> Result<PollOutcome, ClientError> {
        debug!(id, ?mode, "Checking status");

        if mode == PollMode::Once {
            return self.check_once(id).await;
        }

        let deadline = Instant::now() + timeout;
        loop {
            match self.check_once(id).await? {
                PollOutcome::Terminal(status) => return Ok(PollOutcome::Terminal(status)),
                PollOutcome::Pending => {}
            }

            if Instant::now() + self.poll_step > deadline {
                warn!(id, ?timeout, "Poll timed out, status still pending");
                return Ok(PollOutcome::Pending);
            }
            tokio::time::sleep(self.poll_step).await;
        }
    }
}
