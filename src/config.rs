// src/config.rs

//! Configuration loading for the Lambda environment.

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::storage::S3Storage;

/// Reads `config.toml` from the snapshot bucket.
pub struct LambdaConfigLoader {
    storage: S3Storage,
}

impl LambdaConfigLoader {
    pub fn new(storage: S3Storage) -> Self {
        Self { storage }
    }

    /// Load and validate `{prefix}/config.toml`.
    pub async fn load_config(&self) -> Result<Config> {
        let key = self.storage.key("config.toml");
        log::info!("Loading config file from S3: {key}");

        let bytes = self
            .storage
            .read_bytes_optional(&key)
            .await?
            .ok_or_else(|| AppError::config(format!("Config file not found in S3: {key}")))?;
        let text = String::from_utf8(bytes).map_err(|e| {
            AppError::config(format!("Config file {key} is not valid UTF-8: {e}"))
        })?;

        let config = Config::parse(&text)?;
        config.validate()?;
        Ok(config)
    }
}
