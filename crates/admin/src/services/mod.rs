//! Business services for the admin API.

pub mod assets;
pub mod bulk_edit;

pub use assets::AssetStore;
