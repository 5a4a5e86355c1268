pub mod get;
pub mod list;

pub use get::{find_asset, GetAssetQuery};
pub use list::ListAssetsQuery;
