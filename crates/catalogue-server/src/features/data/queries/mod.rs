pub mod get_data;
pub mod read_file;

pub use get_data::{DataContents, GetDataError, GetDataQuery};
pub use read_file::{ReadFileError, ReadFileQuery};
