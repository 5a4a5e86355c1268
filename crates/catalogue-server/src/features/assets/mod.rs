pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{
    CreateAssetCommand, CreateAssetError, CreateAssetResponse, DeleteAssetCommand,
    DeleteAssetError, DeleteAssetResponse,
};
pub use queries::{find_asset, GetAssetQuery, ListAssetsQuery};
pub use routes::assets_routes;
