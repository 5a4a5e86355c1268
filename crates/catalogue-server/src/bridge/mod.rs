//! Filesystem bridge
//!
//! Moves bytes between local files and the distributed filesystem. Two
//! transports are available, chosen by [`config::BridgeConfig`]:
//!
//! - [`webhdfs::WebHdfsBridge`]: a WebHDFS-style HTTP gateway
//! - [`cli::CliBridge`]: a local client such as `hdfs dfs`
//!
//! Every operation reports failure for the single path it was given.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

pub mod cli;
pub mod config;
pub mod webhdfs;

pub use cli::CliBridge;
pub use config::{BridgeConfig, BridgeTransport};
pub use webhdfs::WebHdfsBridge;

/// File contents streamed from the distributed filesystem
pub type ByteStream = BoxStream<'static, Result<Bytes, BridgeError>>;

/// Shared handle to the configured bridge
pub type SharedBridge = Arc<dyn FilesystemBridge>;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Local file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Filesystem gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Filesystem gateway returned {status} for {path}: {message}")]
    Gateway {
        status: u16,
        path: String,
        message: String,
    },

    #[error("Filesystem gateway did not provide an upload location for {0}")]
    MissingLocation(String),

    #[error("Filesystem command failed for {path}: {message}")]
    Command { path: String, message: String },

    #[error("Remote path not found: {0}")]
    NotFound(String),
}

#[async_trait]
pub trait FilesystemBridge: Send + Sync {
    /// Copy a local file to `remote`, overwriting any existing file
    async fn put_file(&self, local: &Path, remote: &str) -> Result<(), BridgeError>;

    /// Stream the contents of a remote file
    async fn get_file(&self, remote: &str) -> Result<ByteStream, BridgeError>;

    /// Names of the entries directly under a remote directory
    async fn list_directory(&self, remote: &str) -> Result<Vec<String>, BridgeError>;
}

/// Build the bridge selected by configuration
pub fn build(config: &BridgeConfig) -> Result<SharedBridge, BridgeError> {
    let bridge: SharedBridge = match config.transport {
        BridgeTransport::WebHdfs => Arc::new(WebHdfsBridge::new(
            config.webhdfs_url.clone(),
            config.webhdfs_user.clone(),
        )?),
        BridgeTransport::Cli => {
            Arc::new(CliBridge::new(config.cli_program.clone(), config.cli_args.clone()))
        },
    };

    tracing::info!(transport = ?config.transport, "Filesystem bridge initialized");
    Ok(bridge)
}

/// Join a remote directory and a file name with exactly one separator
pub fn remote_path(directory: &str, name: &str) -> String {
    format!(
        "{}/{}",
        directory.trim_end_matches('/'),
        name.trim_start_matches('/')
    )
}
