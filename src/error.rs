//! Error types for jobwatch.

/// Persistence errors on the id collection file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse id collection: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors from the remote status client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid job id {raw:?}: expected an integer")]
    InvalidId { raw: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server returned HTTP {status} for id {id}")]
    BadStatus { id: i64, status: u16 },

    #[error("Unexpected response for id {id}: {reason}")]
    UnexpectedResponse { id: i64, reason: String },
}
