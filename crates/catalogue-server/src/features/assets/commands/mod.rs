pub mod create;
pub mod delete;

pub use create::{CreateAssetCommand, CreateAssetError, CreateAssetResponse};
pub use delete::{DeleteAssetCommand, DeleteAssetError, DeleteAssetResponse};
