//! Shared validation utilities
//!
//! ```rust,ignore
//! use catalogue_server::features::shared::validation::{parse_record_id, resolve_import_path};
//!
//! let id = parse_record_id("4c1f0e62-32a8-4a55-a7a0-9d2b1f2a5e10")?;
//! let path = resolve_import_path(&config.import_root, "exports/readings.json")?;
//! ```

use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while validating a client-supplied path
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathValidationError {
    #[error("File path is required and cannot be empty")]
    Required,

    #[error("File path '{0}' escapes the import directory")]
    EscapesRoot(String),
}

/// Parse a record identifier
///
/// Returns `None` for anything that is not a UUID; callers decide whether a
/// malformed id means "absent" or "invalid".
pub fn parse_record_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

/// Resolve a relative path under `root`, refusing to leave it
///
/// Leading slashes are ignored so wildcard captures can be passed as is.
pub fn resolve_import_path(root: &Path, requested: &str) -> Result<PathBuf, PathValidationError> {
    let relative = requested.trim_start_matches('/');
    if relative.trim().is_empty() {
        return Err(PathValidationError::Required);
    }

    let mut resolved = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {},
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(PathValidationError::EscapesRoot(requested.to_string()));
            },
        }
    }

    Ok(resolved)
}

/// A bare file name: no separators, not `.` or `..`
pub fn validate_file_name(name: &str) -> Result<(), PathValidationError> {
    if name.trim().is_empty() {
        return Err(PathValidationError::Required);
    }
    if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(PathValidationError::EscapesRoot(name.to_string()));
    }
    Ok(())
}
