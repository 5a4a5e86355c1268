//! Bounded, retried copies of staged files to the distributed filesystem
//!
//! Each copy runs in its own task. A shared semaphore caps copies in flight;
//! acquiring a permit is what stalls the record source once the cap is hit.
//! Callers observe completion only through [`TransferHandle::wait`].

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::task::TaskTracker;

use super::config::MAX_RETRY_BACKOFF;
use super::staging::{StagedFile, StagingArea};
use crate::bridge::SharedBridge;

/// Exponential backoff between copy attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per copy, including the first
    pub attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            initial_backoff,
            max_backoff: MAX_RETRY_BACKOFF,
        }
    }

    /// Delay after the given failed attempt (1-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// A copy that failed on every attempt; the staged file is kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferFailure {
    pub remote_path: String,
    pub local_path: PathBuf,
    pub attempts: u32,
    pub error: String,
}

/// Outcome of every copy dispatched by one import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransferReport {
    /// Remote paths written successfully
    pub copied: Vec<String>,
    pub failed: Vec<TransferFailure>,
}

impl TransferReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Awaitable set of in-flight copies
#[derive(Debug)]
pub struct TransferHandle {
    tasks: JoinSet<Result<String, TransferFailure>>,
    dispatched: usize,
}

impl TransferHandle {
    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    /// Wait for every copy to finish, in completion order
    pub async fn wait(mut self) -> TransferReport {
        let mut report = TransferReport::default();

        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(Ok(remote)) => report.copied.push(remote),
                Ok(Err(failure)) => report.failed.push(failure),
                Err(e) => {
                    tracing::error!(error = %e, "Copy task aborted");
                    report.failed.push(TransferFailure {
                        remote_path: String::new(),
                        local_path: PathBuf::new(),
                        attempts: 0,
                        error: e.to_string(),
                    });
                },
            }
        }

        report
    }

    /// Await the copies on a background task of `tracker` that logs the report
    ///
    /// Dropping a handle aborts its copies; detaching lets them run to the end
    /// after the request that started them has been answered.
    pub fn detach(self, tracker: &TaskTracker, directory: String) -> JoinHandle<TransferReport> {
        tracker.spawn(async move {
            let report = self.wait().await;

            if report.is_complete() {
                tracing::info!(
                    directory = %directory,
                    copied = report.copied.len(),
                    "Transfers completed"
                );
            } else {
                tracing::warn!(
                    directory = %directory,
                    copied = report.copied.len(),
                    failed = report.failed.len(),
                    "Transfers finished with failures"
                );
                for failure in &report.failed {
                    tracing::warn!(
                        remote = %failure.remote_path,
                        local = %failure.local_path.display(),
                        error = %failure.error,
                        "Staged file awaiting manual copy"
                    );
                }
            }

            report
        })
    }
}

/// Dispatches copies for one import, sharing the pipeline-wide permit pool
pub(crate) struct TransferDispatcher {
    bridge: SharedBridge,
    staging: StagingArea,
    permits: Arc<Semaphore>,
    retry: RetryPolicy,
    handle: TransferHandle,
}

impl TransferDispatcher {
    pub(crate) fn new(
        bridge: SharedBridge,
        staging: StagingArea,
        permits: Arc<Semaphore>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            bridge,
            staging,
            permits,
            retry,
            handle: TransferHandle {
                tasks: JoinSet::new(),
                dispatched: 0,
            },
        }
    }

    /// Start copying `staged` to `remote`, waiting for a free permit first
    pub(crate) async fn dispatch(&mut self, staged: StagedFile, remote: String) {
        // The pool is never closed, so acquisition only fails after shutdown
        let permit = self.permits.clone().acquire_owned().await.ok();

        let bridge = self.bridge.clone();
        let staging = self.staging.clone();
        let retry = self.retry;

        self.handle.tasks.spawn(async move {
            let result = copy_with_retry(bridge, staging, staged, remote, retry).await;
            drop(permit);
            result
        });
        self.handle.dispatched += 1;
    }

    pub(crate) fn finish(self) -> TransferHandle {
        self.handle
    }
}

async fn copy_with_retry(
    bridge: SharedBridge,
    staging: StagingArea,
    staged: StagedFile,
    remote: String,
    retry: RetryPolicy,
) -> Result<String, TransferFailure> {
    let mut attempt = 1;

    loop {
        match bridge.put_file(&staged.local_path, &remote).await {
            Ok(()) => {
                if let Err(e) = staging.discard(&staged).await {
                    tracing::warn!(
                        path = %staged.local_path.display(),
                        error = %e,
                        "Failed to remove staged file"
                    );
                }
                tracing::debug!(remote = %remote, attempt, "Staged file copied");
                return Ok(remote);
            },
            Err(e) if attempt < retry.attempts => {
                let delay = retry.delay(attempt);
                tracing::warn!(
                    remote = %remote,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Copy failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            },
            Err(e) => {
                tracing::error!(
                    remote = %remote,
                    local = %staged.local_path.display(),
                    attempts = attempt,
                    error = %e,
                    "Copy failed, staged file kept"
                );
                return Err(TransferFailure {
                    remote_path: remote,
                    local_path: staged.local_path,
                    attempts: attempt,
                    error: e.to_string(),
                });
            },
        }
    }
}
