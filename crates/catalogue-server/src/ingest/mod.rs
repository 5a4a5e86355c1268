//! Bulk import of records into asset destinations
//!
//! - **destination**: where an asset's data lives (collection or directory)
//! - **decoder**: incremental JSON decoding with bounded read-ahead
//! - **pipeline**: batching into collections, staging into directories
//! - **staging**: local files waiting for copy
//! - **transfer**: bounded, retried copies through the filesystem bridge

pub mod config;
pub mod decoder;
pub mod destination;
pub mod pipeline;
pub mod staging;
pub mod transfer;

pub use config::ImportConfig;
pub use decoder::{decode_json_records, DecodeError, RecordStream};
pub use destination::Destination;
pub use pipeline::{ImportError, ImportOutcome, ImportPipeline, RecordSource};
pub use staging::{StagedFile, StagingArea};
pub use transfer::{RetryPolicy, TransferFailure, TransferHandle, TransferReport};
