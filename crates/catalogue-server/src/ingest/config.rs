//! Import pipeline configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::env_or;

/// Records per bulk write
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Records buffered between the decoder thread and the pipeline
pub const DEFAULT_DECODE_BUFFER: usize = 256;

pub const DEFAULT_MAX_CONCURRENT_TRANSFERS: usize = 8;

pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;

/// Upper bound on the delay between two copy attempts
pub const MAX_RETRY_BACKOFF: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Records per bulk write to a collection
    pub batch_size: usize,

    /// Local directory where records wait for copy to the filesystem
    pub staging_dir: PathBuf,

    /// Files named by `/file/upload` are resolved under this directory
    pub import_root: PathBuf,

    /// Capacity of the decoder hand-off channel
    pub decode_buffer: usize,

    /// Copies to the filesystem in flight at once
    pub max_concurrent_transfers: usize,

    /// Attempts per copy, including the first
    pub retry_attempts: u32,

    /// Delay before the second attempt; doubles after each failure
    pub retry_backoff_ms: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            staging_dir: std::env::temp_dir().join("catalogue-staging"),
            import_root: PathBuf::from("."),
            decode_buffer: DEFAULT_DECODE_BUFFER,
            max_concurrent_transfers: DEFAULT_MAX_CONCURRENT_TRANSFERS,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}

impl ImportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            batch_size: env_or("IMPORT_BATCH_SIZE", defaults.batch_size),
            staging_dir: std::env::var("IMPORT_STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.staging_dir),
            import_root: std::env::var("IMPORT_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.import_root),
            decode_buffer: env_or("IMPORT_DECODE_BUFFER", defaults.decode_buffer),
            max_concurrent_transfers: env_or(
                "IMPORT_MAX_TRANSFERS",
                defaults.max_concurrent_transfers,
            ),
            retry_attempts: env_or("IMPORT_RETRY_ATTEMPTS", defaults.retry_attempts),
            retry_backoff_ms: env_or("IMPORT_RETRY_BACKOFF_MS", defaults.retry_backoff_ms),
        }
    }

    /// Set batch size
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    pub fn with_import_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.import_root = dir.into();
        self
    }

    pub fn with_max_concurrent_transfers(mut self, transfers: usize) -> Self {
        self.max_concurrent_transfers = transfers;
        self
    }

    pub fn with_retry(mut self, attempts: u32, backoff: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_backoff_ms = backoff.as_millis() as u64;
        self
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.batch_size == 0 {
            anyhow::bail!("IMPORT_BATCH_SIZE must be greater than 0");
        }
        if self.decode_buffer == 0 {
            anyhow::bail!("IMPORT_DECODE_BUFFER must be greater than 0");
        }
        if self.max_concurrent_transfers == 0 {
            anyhow::bail!("IMPORT_MAX_TRANSFERS must be greater than 0");
        }
        if self.retry_attempts == 0 {
            anyhow::bail!("IMPORT_RETRY_ATTEMPTS must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ImportConfig::default();
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_backoff(), Duration::from_millis(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ImportConfig::new()
            .with_batch_size(10)
            .with_max_concurrent_transfers(2)
            .with_retry(5, Duration::from_millis(20));

        assert_eq!(config.batch_size, 10);
        assert_eq!(config.max_concurrent_transfers, 2);
        assert_eq!(config.retry_attempts, 5);
        assert_eq!(config.retry_backoff_ms, 20);
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        assert!(ImportConfig::new().with_batch_size(0).validate().is_err());
        assert!(ImportConfig::new().with_retry(0, Duration::ZERO).validate().is_err());
    }
}
