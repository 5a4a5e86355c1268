pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{DataImportResponse, ImportFileCommand, UploadDataCommand};
pub use queries::{DataContents, GetDataQuery, ReadFileQuery};
pub use routes::data_routes;
