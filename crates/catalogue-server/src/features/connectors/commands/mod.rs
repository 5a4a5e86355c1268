pub mod create;
pub mod delete;

pub use create::{CreateConnectorCommand, CreateConnectorError};
pub use delete::{DeleteConnectorCommand, DeleteConnectorError};
