//! Error types shared across the catalogue workspace

use thiserror::Error;

/// Result type alias for catalogue operations
pub type Result<T> = std::result::Result<T, CatalogueError>;

/// Errors raised while building or interpreting catalogue records
#[derive(Error, Debug)]
pub enum CatalogueError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

impl CatalogueError {
    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_display() {
        let err = CatalogueError::missing_field("model.description");
        assert_eq!(err.to_string(), "Missing required field: model.description");
    }

    #[test]
    fn test_serialization_error_from_serde() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = CatalogueError::from(source);
        assert!(matches!(err, CatalogueError::Serialization(_)));
        assert!(err.to_string().starts_with("Serialization error"));
    }
}
