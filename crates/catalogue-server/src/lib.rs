//! Catalogue Server Library
//!
//! HTTP service that catalogues data assets and moves their data.
//!
//! # Overview
//!
//! - **Registries**: assets and connectors stored as JSON documents
//! - **Destination resolution**: an asset's `collection` or `directory`
//!   parameter decides where its data lives
//! - **Bulk import**: batched writes into collections, staged copies into a
//!   distributed filesystem
//! - **Filesystem bridge**: WebHDFS gateway or the local `hdfs dfs` CLI
//! - **Post-create hooks**: connector-specific fan-out on asset registration
//!
//! # Architecture
//!
//! Feature slices (`features/`) split write operations (`commands`) from
//! reads (`queries`). Every slice reaches storage through the injected
//! [`store::DocumentStore`] and the filesystem through
//! [`bridge::FilesystemBridge`].
//!
//! # Example
//!
//! ```no_run
//! use catalogue_server::{api, bridge, config::Config, hooks::HookRegistry, store};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let store: store::SharedStore = Arc::new(store::MemoryDocumentStore::new());
//!     let bridge = bridge::build(&config.bridge)?;
//!     let hooks = HookRegistry::with_defaults(&config.hooks);
//!
//!     let state = api::AppState::new(store, bridge, hooks, &config.import);
//!     let app = api::create_router(state, &config);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod bridge;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod hooks;
pub mod ingest;
pub mod middleware;
pub mod store;

// Re-export commonly used types
pub use error::{AppError, AppResult};
