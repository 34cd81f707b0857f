//! HTTP surface of the status service — snapshot and long-poll status
//! queries over the tracker, plus a liveness probe.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::store::JobStatus;
use crate::tracker::StatusTracker;

/// Timing bounds for long-poll handling.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Step between tracker queries inside a long-poll.
    pub poll_step: Duration,
    /// Server-side bound on one long-poll request.
    pub polling_timeout: Duration,
    /// Cap on concurrently blocked long-polls; excess requests degrade to a
    /// snapshot instead of queueing.
    pub max_concurrent_polls: usize,
}

/// Shared state for the status routes.
#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<StatusTracker>,
    pub cfg: ServiceConfig,
    long_polls: Arc<Semaphore>,
}

impl AppState {
    pub fn new(tracker: Arc<StatusTracker>, cfg: ServiceConfig) -> Self {
        let long_polls = Arc::new(Semaphore::new(cfg.max_concurrent_polls));
        Self {
            tracker,
            cfg,
            long_polls,
        }
    }
}

/// Build the status service router.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/{id}/status", get(get_status))
        .with_state(state)
}

/// Unhandled handler failure: log the detail, leak none of it.
pub struct ServiceError(anyhow::Error);

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "Unhandled error while serving status request");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "An unexpected error occurred"})),
        )
            .into_response()
    }
}

impl<E> From<E> for ServiceError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// ── Handlers ────────────────────────────────────────────────────────────

async fn ping() -> impl IntoResponse {
    Json(serde_json::json!({"result": "pong"}))
}

#[derive(Debug, Deserialize)]
struct StatusQuery {
    #[serde(default)]
    poll: bool,
}

/// GET /{id}/status?poll=<bool>
///
/// Snapshot mode answers immediately, including `pending`. Long-poll mode
/// blocks until the tracker reports a terminal status or the server-side
/// timeout elapses, in which case it answers `pending` — an unfinished job
/// is never an error.
async fn get_status(
    Path(id): Path<i64>,
    Query(query): Query<StatusQuery>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    info!(id, poll = query.poll, "Status check request");

    let status = if query.poll {
        match Arc::clone(&state.long_polls).try_acquire_owned() {
            Ok(_permit) => long_poll(&state, id).await?,
            Err(_) => {
                warn!(id, "Long-poll capacity exhausted, answering with snapshot");
                snapshot(&state, id).await?
            }
        }
    } else {
        snapshot(&state, id).await?
    };

    Ok(Json(serde_json::json!({"result": status.as_str()})))
}

/// One tracker query on a blocking thread. A panicking completion rule
/// surfaces here as an error instead of poisoning the handler.
async fn snapshot(state: &AppState, id: i64) -> Result<JobStatus, ServiceError> {
    let tracker = Arc::clone(&state.tracker);
    Ok(tokio::task::spawn_blocking(move || tracker.get_status(id)).await?)
}

async fn long_poll(state: &AppState, id: i64) -> Result<JobStatus, ServiceError> {
    let deadline = Instant::now() + state.cfg.polling_timeout;

    loop {
        let status = snapshot(state, id).await?;
        if status.is_terminal() {
            return Ok(status);
        }

        if Instant::now() + state.cfg.poll_step > deadline {
            warn!(id, "Long-poll timed out, status still pending");
            return Ok(JobStatus::Pending);
        }
        tokio::time::sleep(state.cfg.poll_step).await;
    }
}
