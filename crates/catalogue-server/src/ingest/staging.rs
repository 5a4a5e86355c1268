//! Local staging of records bound for the distributed filesystem

use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A record written to the staging directory, waiting for copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// `<uuid>.json`
    pub file_name: String,
    pub local_path: PathBuf,
}

/// Directory holding staged record files
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Serialise one record into a freshly named file
    ///
    /// Names are random UUIDs, so concurrent imports never collide.
    pub async fn stage(&self, record: &Value) -> io::Result<StagedFile> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let file_name = format!("{}.json", Uuid::new_v4());
        let local_path = self.dir.join(&file_name);
        let bytes = serde_json::to_vec(record)?;
        tokio::fs::write(&local_path, bytes).await?;

        tracing::trace!(path = %local_path.display(), "Record staged");
        Ok(StagedFile {
            file_name,
            local_path,
        })
    }

    /// Remove a staged file after it was copied
    pub async fn discard(&self, staged: &StagedFile) -> io::Result<()> {
        match tokio::fs::remove_file(&staged.local_path).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}
