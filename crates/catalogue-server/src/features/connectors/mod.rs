pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{
    CreateConnectorCommand, CreateConnectorError, DeleteConnectorCommand, DeleteConnectorError,
};
pub use routes::connectors_routes;
