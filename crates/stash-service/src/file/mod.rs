//! File Lifecycle Manager.

pub mod service;
pub mod upload;

pub use service::{FileService, RegisterFile, ReplaceContent, UpdateFileRequest};
pub use upload::{UploadContent, UploadService};
