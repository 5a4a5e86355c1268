//! Bulk import of records into a resolved destination
//!
//! Collections receive records in fixed-size batches: a batch is flushed the
//! moment it holds `batch_size` records and the remainder is flushed at end
//! of input. While a flush is awaited the record stream is not polled, which
//! is what pushes back on the decoder.
//!
//! Directories receive one staged file per record, copied by the bridge on
//! background tasks collected in a [`TransferHandle`].

use futures::StreamExt;
use serde_json::Value;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;

use catalogue_common::types::RECORD_ID_FIELD;

use super::config::ImportConfig;
use super::decoder::{decode_json_records, DecodeError, RecordStream};
use super::destination::Destination;
use super::staging::StagingArea;
use super::transfer::{RetryPolicy, TransferDispatcher, TransferHandle};
use crate::bridge::{remote_path, SharedBridge};
use crate::store::{SharedStore, StoreError, ASSETS_COLLECTION, CONNECTORS_COLLECTION};

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Asset has neither a collection nor a directory parameter")]
    Unresolved,

    #[error("Collection '{0}' is reserved for the catalogue registry")]
    ReservedCollection(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Failed to stage record: {0}")]
    Staging(#[source] std::io::Error),
}

/// Records to import
#[derive(Debug)]
pub enum RecordSource {
    /// Records already in memory
    Records(Vec<Value>),
    /// Records decoded lazily from serialised bytes
    Stream(RecordStream),
}

impl RecordSource {
    /// A request payload: an array of records, or one record
    pub fn from_payload(payload: Value) -> Self {
        match payload {
            Value::Array(records) => Self::Records(records),
            record => Self::Records(vec![record]),
        }
    }
}

/// What an import did
#[derive(Debug)]
pub struct ImportOutcome {
    pub destination: Destination,
    /// Records written to a collection, or staged for copy
    pub accepted: usize,
    /// Bulk writes issued against the store
    pub batches: usize,
    /// Copies still running, for directory destinations
    pub transfers: Option<TransferHandle>,
}

#[derive(Clone)]
pub struct ImportPipeline {
    store: SharedStore,
    bridge: SharedBridge,
    staging: StagingArea,
    permits: Arc<Semaphore>,
    retry: RetryPolicy,
    batch_size: usize,
    decode_buffer: usize,
    /// Detached copies, drained on shutdown
    background: TaskTracker,
}

impl ImportPipeline {
    pub fn new(store: SharedStore, bridge: SharedBridge, config: &ImportConfig) -> Self {
        Self {
            store,
            bridge,
            staging: StagingArea::new(config.staging_dir.clone()),
            permits: Arc::new(Semaphore::new(config.max_concurrent_transfers.max(1))),
            retry: RetryPolicy::new(config.retry_attempts, config.retry_backoff()),
            batch_size: config.batch_size.max(1),
            decode_buffer: config.decode_buffer,
            background: TaskTracker::new(),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Let `transfers` finish in the background, logging their report
    pub fn detach(&self, transfers: TransferHandle, directory: &str) {
        transfers.detach(&self.background, directory.to_string());
    }

    /// Copies detached and not yet finished
    pub fn pending_transfers(&self) -> usize {
        self.background.len()
    }

    /// Wait up to `timeout` for every detached copy
    ///
    /// Returns `false` when copies were still running at the deadline; their
    /// staged files stay in the staging directory.
    pub async fn drain(&self, timeout: Duration) -> bool {
        self.background.close();
        let drained = tokio::time::timeout(timeout, self.background.wait()).await.is_ok();
        if !drained {
            tracing::warn!(
                pending = self.background.len(),
                staging_dir = %self.staging.dir().display(),
                "Shutdown deadline reached with copies in flight; staged files kept"
            );
        }
        drained
    }

    /// Decode records from `reader` as they are consumed
    pub fn stream_from<R>(&self, reader: R) -> RecordSource
    where
        R: Read + Send + 'static,
    {
        RecordSource::Stream(decode_json_records(reader, self.decode_buffer))
    }

    #[tracing::instrument(skip(self, source), fields(destination = %destination))]
    pub async fn import_records(
        &self,
        destination: &Destination,
        source: RecordSource,
    ) -> Result<ImportOutcome, ImportError> {
        match destination {
            Destination::Collection(name) => {
                if name == ASSETS_COLLECTION || name == CONNECTORS_COLLECTION {
                    return Err(ImportError::ReservedCollection(name.clone()));
                }
                let (accepted, batches) = self.import_into_collection(name, source).await?;
                tracing::info!(collection = %name, accepted, batches, "Records imported");

                Ok(ImportOutcome {
                    destination: destination.clone(),
                    accepted,
                    batches,
                    transfers: None,
                })
            },
            Destination::FilesystemDirectory(directory) => {
                let (accepted, handle) = self.stage_into_directory(directory, source).await?;
                tracing::info!(directory = %directory, accepted, "Records dispatched for copy");

                Ok(ImportOutcome {
                    destination: destination.clone(),
                    accepted,
                    batches: 0,
                    transfers: Some(handle),
                })
            },
            Destination::Unresolved => Err(ImportError::Unresolved),
        }
    }

    async fn import_into_collection(
        &self,
        collection: &str,
        source: RecordSource,
    ) -> Result<(usize, usize), ImportError> {
        let mut batch = Vec::with_capacity(self.batch_size);
        let mut accepted = 0;
        let mut batches = 0;

        match source {
            RecordSource::Records(records) => {
                for record in records {
                    batch.push(record);
                    if batch.len() == self.batch_size {
                        accepted += self.flush(collection, &mut batch).await?;
                        batches += 1;
                    }
                }
            },
            RecordSource::Stream(mut stream) => {
                while let Some(record) = stream.next().await {
                    batch.push(without_id(record?));
                    if batch.len() == self.batch_size {
                        accepted += self.flush(collection, &mut batch).await?;
                        batches += 1;
                    }
                }
            },
        }

        if !batch.is_empty() {
            accepted += self.flush(collection, &mut batch).await?;
            batches += 1;
        }

        Ok((accepted, batches))
    }

    async fn flush(&self, collection: &str, batch: &mut Vec<Value>) -> Result<usize, ImportError> {
        let records = std::mem::replace(batch, Vec::with_capacity(self.batch_size));
        let count = records.len();
        self.store.insert_many(collection, records).await?;
        tracing::debug!(collection, count, "Batch flushed");
        Ok(count)
    }

    async fn stage_into_directory(
        &self,
        directory: &str,
        source: RecordSource,
    ) -> Result<(usize, TransferHandle), ImportError> {
        let mut dispatcher = TransferDispatcher::new(
            self.bridge.clone(),
            self.staging.clone(),
            self.permits.clone(),
            self.retry,
        );

        let staged = match source {
            RecordSource::Records(records) => {
                let mut result = Ok(0);
                for record in records {
                    if let Err(e) = self.stage_one(&mut dispatcher, directory, &record).await {
                        result = Err(e);
                        break;
                    }
                    result = result.map(|n| n + 1);
                }
                result
            },
            RecordSource::Stream(mut stream) => {
                let mut result = Ok(0);
                while let Some(record) = stream.next().await {
                    let staged = match record {
                        Ok(record) => {
                            self.stage_one(&mut dispatcher, directory, &without_id(record))
                                .await
                        },
                        Err(e) => Err(e.into()),
                    };
                    if let Err(e) = staged {
                        result = Err(e);
                        break;
                    }
                    result = result.map(|n| n + 1);
                }
                result
            },
        };

        match staged {
            Ok(accepted) => Ok((accepted, dispatcher.finish())),
            Err(e) => {
                // Copies already dispatched still run to completion
                self.detach(dispatcher.finish(), directory);
                Err(e)
            },
        }
    }

    async fn stage_one(
        &self,
        dispatcher: &mut TransferDispatcher,
        directory: &str,
        record: &Value,
    ) -> Result<(), ImportError> {
        let staged = self
            .staging
            .stage(record)
            .await
            .map_err(ImportError::Staging)?;
        let remote = remote_path(directory, &staged.file_name);
        dispatcher.dispatch(staged, remote).await;
        Ok(())
    }
}

/// Drop any identifier carried over from another store
fn without_id(mut record: Value) -> Value {
    if let Value::Object(ref mut map) = record {
        map.remove(RECORD_ID_FIELD);
    }
    record
}
