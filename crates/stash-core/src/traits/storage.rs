//! Blob store trait for pluggable physical byte storage.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// A byte stream type used for reading blob contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Owner of physical file bytes.
///
/// The metadata core never interprets handles; it stores whatever
/// [`BlobStore::write`] returns on the file record and hands it back for
/// reads, replacement, and deletion. Paths and handles are relative to the
/// configured upload base path.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend type name (e.g., "local", "memory").
    fn provider_type(&self) -> &str;

    /// Check whether the backend is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Durably store bytes at `path` and return the handle to record.
    async fn write(&self, path: &str, data: Bytes) -> AppResult<String>;

    /// Overwrite the bytes behind an existing handle.
    async fn replace(&self, handle: &str, data: Bytes) -> AppResult<()>;

    /// Open the bytes behind a handle for streaming.
    async fn open_for_read(&self, handle: &str) -> AppResult<ByteStream>;

    /// Delete the bytes behind a handle.
    ///
    /// Returns `false` when nothing was stored there; a missing blob is not
    /// an error.
    async fn delete(&self, handle: &str) -> AppResult<bool>;

    /// Create a directory (and any missing parents).
    async fn ensure_directory(&self, path: &str) -> AppResult<()>;
}
