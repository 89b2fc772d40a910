//! Local filesystem snapshot storage.
//!
//! Used by the CLI. Production deployments use `S3Storage`.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::{JailSnapshot, SnapshotStore, snapshot_name};

/// Snapshot files under a single directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(path)
    }

    /// Read bytes, returning None if the file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<PathBuf> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl SnapshotStore for LocalStorage {
    async fn load_snapshot(
        &self,
        facility: &str,
        date: NaiveDate,
    ) -> Result<Option<JailSnapshot>> {
        self.read_json(&snapshot_name(facility, date)).await
    }

    async fn save_snapshot(&self, snapshot: &JailSnapshot) -> Result<String> {
        let path = self.write_json(&snapshot.name(), snapshot).await?;
        log::info!(
            "Wrote {} inmates to {}",
            snapshot.inmates.len(),
            path.display()
        );
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InmateRecord, InmateStub, SessionState};
    use chrono::Utc;
    use tempfile::TempDir;

    fn snapshot(facility: &str, date: NaiveDate) -> JailSnapshot {
        let stub: InmateStub = serde_json::from_value(serde_json::json!({
            "arrestNo": "A1",
            "agencyName": "County Sheriff"
        }))
        .unwrap();
        JailSnapshot {
            facility: facility.to_string(),
            title: "Test County Jail".to_string(),
            date,
            started_at: Utc::now(),
            finished_at: Utc::now(),
            state: SessionState::Complete,
            enriched: 0,
            skipped: Vec::new(),
            inmates: vec![InmateRecord::from(stub)],
        }
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage.write_bytes("test.txt", b"hello").await.unwrap();
        let data = storage.read_bytes("test.txt").await.unwrap();
        assert_eq!(data, Some(b"hello".to_vec()));
        assert!(!tmp.path().join("test.tmp").exists());
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        assert!(storage.read_bytes("nope.txt").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_snapshot_save_load() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("cache"));
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

        let location = storage
            .save_snapshot(&snapshot("test-jail", today))
            .await
            .unwrap();
        assert!(location.ends_with("test-jail-2026-10-18.json"));

        let loaded = storage
            .load_snapshot("test-jail", today)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.inmates.len(), 1);
        assert_eq!(loaded.inmates[0].arrest_no(), "A1");
        assert_eq!(loaded.state, SessionState::Complete);

        let yesterday = today.pred_opt().unwrap();
        assert!(
            storage
                .load_snapshot("test-jail", yesterday)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

        storage
            .write_bytes(&snapshot_name("bad", today), b"{not json")
            .await
            .unwrap();
        assert!(storage.load_snapshot("bad", today).await.is_err());
    }
}
