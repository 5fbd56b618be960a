//! Shared test helpers for integration tests.
//!
//! Every service is wired against the in-memory stores and blob store, so
//! the suites run without PostgreSQL or a writable disk.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;

use stash_core::config::StorageConfig;
use stash_core::error::AppError;
use stash_core::result::AppResult;
use stash_core::traits::{BlobStore, ByteStream};
use stash_core::types::ParentRef;
use stash_database::EntityStores;
use stash_entity::file::File;
use stash_entity::folder::Folder;
use stash_service::file::UploadContent;
use stash_service::folder::CreateFolderRequest;
use stash_service::{
    AccessService, FileService, FolderService, LinkService, ShareService, StoreDeadline,
    TrashService, UploadService,
};
use stash_storage::MemoryBlobStore;

/// Tenant used by most tests.
pub const OWNER: &str = "u1";

/// Base URL the link service is configured with.
pub const BASE_URL: &str = "https://stash.test";

/// Test application context
pub struct TestApp {
    pub stores: EntityStores,
    pub blobs: Arc<MemoryBlobStore>,
    pub folders: Arc<FolderService>,
    pub files: Arc<FileService>,
    pub uploads: UploadService,
    pub shares: Arc<ShareService>,
    pub access: AccessService,
    pub trash: TrashService,
}

impl TestApp {
    /// Create a new test application with empty stores.
    pub fn new() -> Self {
        Self::with_storage(&StorageConfig::default())
    }

    /// Create a test application with a custom storage configuration.
    pub fn with_storage(storage: &StorageConfig) -> Self {
        let stores = EntityStores::memory();
        let blobs = Arc::new(MemoryBlobStore::new());
        let dyn_blobs: Arc<dyn BlobStore> = blobs.clone();
        let deadline = StoreDeadline::default();

        let folders = Arc::new(FolderService::new(
            stores.folders.clone(),
            dyn_blobs.clone(),
            deadline,
        ));
        let files = Arc::new(FileService::new(
            stores.files.clone(),
            stores.folders.clone(),
            stores.shares.clone(),
            dyn_blobs.clone(),
            deadline,
        ));
        let shares = Arc::new(ShareService::new(
            stores.shares.clone(),
            stores.files.clone(),
            Arc::new(LinkService::new(BASE_URL, 32)),
            deadline,
        ));

        Self {
            uploads: UploadService::new(files.clone(), dyn_blobs.clone(), storage),
            access: AccessService::new(shares.clone(), dyn_blobs),
            trash: TrashService::new(folders.clone(), files.clone()),
            stores,
            blobs,
            folders,
            files,
            shares,
        }
    }

    /// Create a folder owned by [`OWNER`].
    pub async fn folder(&self, name: &str, parent: ParentRef) -> Folder {
        self.folders
            .create(CreateFolderRequest {
                owner: OWNER.to_string(),
                name: name.to_string(),
                parent,
                description: None,
            })
            .await
            .expect("Failed to create folder")
    }

    /// Upload a small text file owned by [`OWNER`].
    pub async fn upload(&self, name: &str, folder: ParentRef, body: &str) -> File {
        self.uploads
            .ingest(OWNER, folder, content(name, body))
            .await
            .expect("Failed to upload file")
    }
}

/// Build an upload payload.
pub fn content(name: &str, body: &str) -> UploadContent {
    UploadContent {
        file_name: name.to_string(),
        mime_type: None,
        data: Bytes::from(body.to_string()),
    }
}

/// Drain a byte stream into a string.
pub async fn read_all(mut stream: ByteStream) -> String {
    let mut buf = Vec::new();
    while let Some(chunk) = stream.next().await {
        buf.extend_from_slice(&chunk.expect("stream chunk"));
    }
    String::from_utf8(buf).expect("utf-8 body")
}

/// Blob store whose directory creation always fails.
#[derive(Debug, Default)]
pub struct FailingDirectories {
    inner: MemoryBlobStore,
}

#[async_trait]
impl BlobStore for FailingDirectories {
    fn provider_type(&self) -> &str {
        "failing"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(false)
    }

    async fn write(&self, path: &str, data: Bytes) -> AppResult<String> {
        self.inner.write(path, data).await
    }

    async fn replace(&self, handle: &str, data: Bytes) -> AppResult<()> {
        self.inner.replace(handle, data).await
    }

    async fn open_for_read(&self, handle: &str) -> AppResult<ByteStream> {
        self.inner.open_for_read(handle).await
    }

    async fn delete(&self, handle: &str) -> AppResult<bool> {
        self.inner.delete(handle).await
    }

    async fn ensure_directory(&self, _path: &str) -> AppResult<()> {
        Err(AppError::storage("No space left on device"))
    }
}
