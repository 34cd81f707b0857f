//! Durable id collection — a flat JSON array of job records, read and
//! rewritten in full on every mutation.
//!
//! All access goes through a single lock so the loader's scan and the
//! worker's read-modify-write never interleave on the file.

use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::error::StoreError;

/// Lifecycle status of a tracked job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    #[serde(rename = "not processed")]
    NotProcessed,
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "processing")]
    Processing,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "error")]
    Error,
}

impl JobStatus {
    /// Terminal statuses never transition again and are never re-enqueued.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }

    /// Parse a persisted status string. Unknown strings map to `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "not processed" => Some(JobStatus::NotProcessed),
            "pending" => Some(JobStatus::Pending),
            "processing" => Some(JobStatus::Processing),
            "completed" => Some(JobStatus::Completed),
            "error" => Some(JobStatus::Error),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::NotProcessed => "not processed",
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn lenient_status<'de, D>(deserializer: D) -> Result<Option<JobStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(JobStatus::parse))
}

/// One persisted record. A missing or unrecognized status is kept as `None`
/// and treated as re-enqueueable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: i64,
    #[serde(
        default,
        deserialize_with = "lenient_status",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<JobStatus>,
}

impl JobRecord {
    /// Whether the loader should feed this record back into the queue.
    pub fn is_reenqueueable(&self) -> bool {
        matches!(
            self.status,
            None | Some(JobStatus::Pending) | Some(JobStatus::NotProcessed)
        )
    }
}

/// File-backed store of job records.
pub struct StatusStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl StatusStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Scan the collection for ids awaiting a terminal result, in file order.
    ///
    /// Read or parse failures are logged and yield an empty scan; the next
    /// loader cycle retries.
    pub async fn load_pending(&self) -> Vec<i64> {
        let _guard = self.lock.lock().await;
        match self.read_records().await {
            Ok(records) => records
                .iter()
                .filter(|r| r.is_reenqueueable())
                .map(|r| r.id)
                .collect(),
            Err(e) => {
                error!(error = %e, path = %self.path.display(), "Failed to load ids from file");
                Vec::new()
            }
        }
    }

    /// Overwrite the status of `id`, rewriting the whole collection.
    ///
    /// An absent id is a no-op. On I/O failure the update is dropped — the
    /// record keeps its old status and the loader will retry the id.
    pub async fn update_status(&self, id: i64, status: JobStatus) {
        let _guard = self.lock.lock().await;
        match self.write_status(id, status).await {
            Ok(true) => info!(id, status = %status, "Updated id status"),
            Ok(false) => debug!(id, "Id not in collection, skipping status update"),
            Err(e) => {
                error!(error = %e, id, status = %status, "Failed to update id status, update dropped");
            }
        }
    }

    /// Read the whole collection. Used by recovery paths and tests.
    pub async fn read_all(&self) -> Result<Vec<JobRecord>, StoreError> {
        let _guard = self.lock.lock().await;
        self.read_records().await
    }

    async fn read_records(&self) -> Result<Vec<JobRecord>, StoreError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn write_status(&self, id: i64, status: JobStatus) -> Result<bool, StoreError> {
        let mut records = self.read_records().await?;
        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(false);
        };
        record.status = Some(status);
        let json = serde_json::to_string_pretty(&records)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with(contents: &str) -> (StatusStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.json");
        tokio::fs::write(&path, contents).await.unwrap();
        (StatusStore::new(path), dir)
    }

    #[tokio::test]
    async fn load_pending_selects_reenqueueable_in_file_order() {
        let (store, _dir) = store_with(
            r#"[
                {"id": 3, "status": "pending"},
                {"id": 1, "status": "completed"},
                {"id": 7, "status": "not processed"},
                {"id": 9},
                {"id": 2, "status": "error"}
            ]"#,
        )
        .await;
        assert_eq!(store.load_pending().await, vec![3, 7, 9]);
    }

    #[tokio::test]
    async fn terminal_ids_are_never_selected() {
        let (store, _dir) = store_with(
            r#"[{"id": 1, "status": "completed"}, {"id": 2, "status": "error"}]"#,
        )
        .await;
        assert!(store.load_pending().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_status_is_treated_as_reenqueueable() {
        let (store, _dir) = store_with(r#"[{"id": 5, "status": "mystery"}]"#).await;
        assert_eq!(store.load_pending().await, vec![5]);
    }

    #[tokio::test]
    async fn corrupt_file_yields_empty_scan() {
        let (store, _dir) = store_with("{not json").await;
        assert!(store.load_pending().await.is_empty());
    }

    #[tokio::test]
    async fn missing_file_yields_empty_scan() {
        let dir = tempfile::tempdir().unwrap();
        let store = StatusStore::new(dir.path().join("nope.json"));
        assert!(store.load_pending().await.is_empty());
    }

    #[tokio::test]
    async fn update_status_rewrites_matching_record() {
        let (store, _dir) = store_with(
            r#"[{"id": 1, "status": "pending"}, {"id": 2, "status": "pending"}]"#,
        )
        .await;
        store.update_status(1, JobStatus::Completed).await;

        let records = store.read_all().await.unwrap();
        assert_eq!(records[0].status, Some(JobStatus::Completed));
        assert_eq!(records[1].status, Some(JobStatus::Pending));
        assert_eq!(store.load_pending().await, vec![2]);
    }

    #[tokio::test]
    async fn update_status_for_absent_id_is_a_noop() {
        let (store, _dir) = store_with(r#"[{"id": 1, "status": "pending"}]"#).await;
        store.update_status(42, JobStatus::Completed).await;

        let records = store.read_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, Some(JobStatus::Pending));
    }
}
