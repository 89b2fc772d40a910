//! AWS S3 snapshot storage.
//!
//! Snapshots live at `s3://{bucket}/{prefix}/{slug}-{YYYY-MM-DD}.json`.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::storage::{JailSnapshot, SnapshotStore, snapshot_name};

/// S3-backed snapshot store; also serves `config.toml` to the Lambda.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    prefix: String,
}

impl S3Storage {
    pub fn new(client: Client, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    /// Create S3 storage from environment configuration.
    ///
    /// `S3_BUCKET` is required; `S3_PREFIX` defaults to `jtt`.
    pub async fn from_env() -> Result<Self> {
        let bucket = std::env::var("S3_BUCKET")
            .map_err(|_| AppError::config("S3_BUCKET must be set"))?;
        let prefix = std::env::var("S3_PREFIX").unwrap_or_else(|_| "jtt".to_string());

        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Ok(Self::new(Client::new(&config), bucket, prefix))
    }

    /// Full object key for a name under the prefix.
    pub fn key(&self, name: &str) -> String {
        let prefix = self.prefix.trim_matches('/');
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}/{name}")
        }
    }

    /// Read an object, returning None if the key does not exist.
    pub async fn read_bytes_optional(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(output) => {
                let bytes = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| AppError::storage(format!("s3://{}/{key}: {e}", self.bucket)))?;
                Ok(Some(bytes.into_bytes().to_vec()))
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    log::info!("No existing object at s3://{}/{}", self.bucket, key);
                    Ok(None)
                } else {
                    Err(AppError::storage(format!(
                        "s3://{}/{key}: {service_err}",
                        self.bucket
                    )))
                }
            }
        }
    }

    async fn write_bytes(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| AppError::storage(format!("s3://{}/{key}: {e}", self.bucket)))?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for S3Storage {
    async fn load_snapshot(
        &self,
        facility: &str,
        date: NaiveDate,
    ) -> Result<Option<JailSnapshot>> {
        let key = self.key(&snapshot_name(facility, date));
        match self.read_bytes_optional(&key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn save_snapshot(&self, snapshot: &JailSnapshot) -> Result<String> {
        let key = self.key(&snapshot.name());
        let json = serde_json::to_vec_pretty(snapshot)?;
        self.write_bytes(&key, json).await?;

        let location = format!("s3://{}/{}", self.bucket, key);
        log::info!("Wrote {} inmates to {location}", snapshot.inmates.len());
        Ok(location)
    }
}
