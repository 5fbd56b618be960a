//! In-memory blob store.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use stash_core::error::AppError;
use stash_core::result::AppResult;
use stash_core::traits::storage::{BlobStore, ByteStream};

use crate::path::normalize;

/// Blob store that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Bytes>>,
    directories: RwLock<HashSet<String>>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a blob is stored under `handle`.
    pub async fn contains(&self, handle: &str) -> bool {
        self.blobs.read().await.contains_key(handle)
    }

    /// Number of stored blobs.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// Whether the store holds no blobs.
    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }

    /// Whether `ensure_directory` was called for `path`.
    pub async fn has_directory(&self, path: &str) -> bool {
        match normalize(path) {
            Ok(clean) => self.directories.read().await.contains(&clean),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn write(&self, path: &str, data: Bytes) -> AppResult<String> {
        let handle = normalize(path)?;
        self.blobs.write().await.insert(handle.clone(), data);
        Ok(handle)
    }

    async fn replace(&self, handle: &str, data: Bytes) -> AppResult<()> {
        let handle = normalize(handle)?;
        self.blobs.write().await.insert(handle, data);
        Ok(())
    }

    async fn open_for_read(&self, handle: &str) -> AppResult<ByteStream> {
        let clean = normalize(handle)?;
        let data = self
            .blobs
            .read()
            .await
            .get(&clean)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Blob not found: {handle}")))?;
        Ok(Box::pin(futures::stream::once(async move {
            Ok::<_, std::io::Error>(data)
        })))
    }

    async fn delete(&self, handle: &str) -> AppResult<bool> {
        let clean = normalize(handle)?;
        Ok(self.blobs.write().await.remove(&clean).is_some())
    }

    async fn ensure_directory(&self, path: &str) -> AppResult<()> {
        let clean = normalize(path)?;
        self.directories.write().await.insert(clean);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use futures::TryStreamExt;
    use stash_core::error::ErrorKind;

    use super::*;

    #[tokio::test]
    async fn test_round_trip_and_missing_delete() {
        let store = MemoryBlobStore::new();
        let handle = store.write("u1/x.bin", Bytes::from_static(b"abc")).await.unwrap();
        let chunks: Vec<Bytes> = store
            .open_for_read(&handle)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(chunks.concat(), b"abc");
        assert!(store.delete(&handle).await.unwrap());
        assert!(!store.delete(&handle).await.unwrap());
        let err = store.open_for_read(&handle).await.err().unwrap();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
