//! Catalogue Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the catalogue workspace.
//!
//! # Overview
//!
//! - **Types**: asset, connector and parameter records shared by every component
//! - **Error Handling**: common error and result types
//! - **Logging**: centralized `tracing` initialisation
//!
//! # Example
//!
//! ```no_run
//! use catalogue_common::types::{AssetDraft, Parameter};
//!
//! fn collection_of(draft: &AssetDraft) -> Option<&str> {
//!     Parameter::find(&draft.interface.parameters, "collection")
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{CatalogueError, Result};
