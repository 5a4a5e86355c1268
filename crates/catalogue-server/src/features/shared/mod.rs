//! Shared utilities for feature modules
//!
//! - **validation**: identifier and path checks
//! - **test_helpers**: fixtures for handler tests (test-only)

pub mod validation;

#[cfg(test)]
pub mod test_helpers;

pub use validation::{parse_record_id, resolve_import_path, validate_file_name, PathValidationError};
