//! Where an asset's data lives

use catalogue_common::types::{Asset, Parameter};
use serde::Serialize;
use std::fmt;

/// Parameter naming a document-store collection
pub const COLLECTION_PARAMETER: &str = "collection";

/// Parameter naming a distributed-filesystem directory
pub const DIRECTORY_PARAMETER: &str = "directory";

/// Resolved target for data movement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum Destination {
    /// Records are appended to a named collection
    Collection(String),
    /// Records are copied one file each into a directory
    FilesystemDirectory(String),
    /// The asset names neither; a configuration error
    Unresolved,
}

impl Destination {
    /// Decide the destination from an asset's interface parameters
    ///
    /// The first `collection` parameter wins over any `directory`.
    pub fn resolve(asset: &Asset) -> Self {
        Self::from_parameters(&asset.interface.parameters)
    }

    pub fn from_parameters(parameters: &[Parameter]) -> Self {
        if let Some(collection) = Parameter::find(parameters, COLLECTION_PARAMETER) {
            return Self::Collection(collection.to_string());
        }
        if let Some(directory) = Parameter::find(parameters, DIRECTORY_PARAMETER) {
            return Self::FilesystemDirectory(directory.to_string());
        }
        Self::Unresolved
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collection(name) => write!(f, "collection {}", name),
            Self::FilesystemDirectory(path) => write!(f, "directory {}", path),
            Self::Unresolved => write!(f, "unresolved destination"),
        }
    }
}
