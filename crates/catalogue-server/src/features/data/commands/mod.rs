pub mod import_file;
pub mod upload;

pub use import_file::{ImportFileCommand, ImportFileError};
pub use upload::{DataImportResponse, UploadBody, UploadDataCommand, UploadDataError};
