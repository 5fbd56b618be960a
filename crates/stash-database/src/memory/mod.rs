//! In-process store implementations.
//!
//! Each store keeps its collection in a `tokio::sync::RwLock<HashMap>` and
//! enforces the same uniqueness rules as the PostgreSQL schema while holding
//! the write lock, so concurrent writers observe the same outcomes they would
//! against the database.

pub mod file;
pub mod folder;
pub mod share;

pub use file::MemoryFileStore;
pub use folder::MemoryFolderStore;
pub use share::MemoryShareStore;
