//! Folder domain entities.

pub mod model;
pub mod query;

pub use model::{CreateFolder, Folder, FolderPatch};
pub use query::FolderQuery;
