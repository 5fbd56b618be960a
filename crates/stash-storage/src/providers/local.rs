//! Local filesystem blob store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::debug;

use stash_core::error::{AppError, ErrorKind};
use stash_core::result::AppResult;
use stash_core::traits::storage::{BlobStore, ByteStream};

use crate::path::normalize;

/// Blob store writing under a root directory.
///
/// Handles are the normalized relative paths the bytes were written to.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Create a store rooted at `root_path`, creating the directory if needed.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// The directory all handles are relative to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> AppResult<(String, PathBuf)> {
        let clean = normalize(path)?;
        let full = self.root.join(&clean);
        Ok((clean, full))
    }

    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                storage_error(format!("Failed to create parent directory: {}", parent.display()), e)
            })?;
        }
        Ok(())
    }

    /// Write to a sibling temp file, then rename over the target so readers
    /// never observe a partial blob.
    async fn write_atomic(&self, full_path: &Path, data: &Bytes) -> AppResult<()> {
        self.ensure_parent(full_path).await?;
        let tmp_path = full_path.with_extension(format!("{}.part", uuid::Uuid::new_v4().simple()));

        let result = async {
            let mut file = fs::File::create(&tmp_path).await?;
            file.write_all(data).await?;
            file.sync_all().await?;
            fs::rename(&tmp_path, full_path).await?;
            Ok::<(), std::io::Error>(())
        }
        .await;

        if let Err(e) = result {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(storage_error(
                format!("Failed to write blob: {}", full_path.display()),
                e,
            ));
        }
        Ok(())
    }
}

/// Map an I/O failure, keeping timeouts retryable.
fn storage_error(message: String, e: std::io::Error) -> AppError {
    let kind = match e.kind() {
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted => ErrorKind::Transient,
        _ => ErrorKind::Storage,
    };
    AppError::with_source(kind, message, e)
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn write(&self, path: &str, data: Bytes) -> AppResult<String> {
        let (handle, full_path) = self.resolve(path)?;
        self.write_atomic(&full_path, &data).await?;
        debug!(handle = %handle, bytes = data.len(), "Wrote blob");
        Ok(handle)
    }

    async fn replace(&self, handle: &str, data: Bytes) -> AppResult<()> {
        let (handle, full_path) = self.resolve(handle)?;
        self.write_atomic(&full_path, &data).await?;
        debug!(handle = %handle, bytes = data.len(), "Replaced blob");
        Ok(())
    }

    async fn open_for_read(&self, handle: &str) -> AppResult<ByteStream> {
        let (_, full_path) = self.resolve(handle)?;
        let file = fs::File::open(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Blob not found: {handle}"))
            } else {
                storage_error(format!("Failed to open blob: {handle}"), e)
            }
        })?;
        Ok(Box::pin(ReaderStream::new(file)))
    }

    async fn delete(&self, handle: &str) -> AppResult<bool> {
        let (_, full_path) = self.resolve(handle)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => {
                debug!(handle, "Deleted blob");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(storage_error(format!("Failed to delete blob: {handle}"), e)),
        }
    }

    async fn ensure_directory(&self, path: &str) -> AppResult<()> {
        let (_, full_path) = self.resolve(path)?;
        fs::create_dir_all(&full_path).await.map_err(|e| {
            storage_error(format!("Failed to create directory: {path}"), e)
        })
    }
}
