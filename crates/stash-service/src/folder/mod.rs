//! Folder Tree Manager.

pub mod service;
pub mod tree;

pub use service::{CreateFolderRequest, FolderService, Subtree, UpdateFolderRequest};
