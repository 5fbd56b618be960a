//! Persistence traits for the three collections.
//!
//! Services depend on these traits only. Every method is a single store
//! round-trip; multi-record operations are expressed as bulk updates over a
//! query predicate so that cascades never need a cross-collection
//! transaction.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use stash_core::result::AppResult;
use stash_core::types::{FileId, FolderId, ShareId};
use stash_entity::file::{CreateFile, File, FilePatch, FileQuery};
use stash_entity::folder::{CreateFolder, Folder, FolderPatch, FolderQuery};
use stash_entity::share::{CreateShare, Share, ShareQuery};

use crate::memory::{MemoryFileStore, MemoryFolderStore, MemoryShareStore};
use crate::repositories::{FileRepository, FolderRepository, ShareRepository};

/// Folder persistence.
#[async_trait]
pub trait FolderStore: Send + Sync + Debug + 'static {
    /// Fetch one folder regardless of trash state.
    async fn get(&self, id: FolderId) -> AppResult<Option<Folder>>;

    /// All folders matching `query`, ordered by name.
    async fn find(&self, query: &FolderQuery) -> AppResult<Vec<Folder>>;

    /// Persist a new folder.
    ///
    /// Fails with `DuplicateName` when an active sibling already has the
    /// same name.
    async fn insert(&self, data: &CreateFolder) -> AppResult<Folder>;

    /// Apply a patch to one folder and return the new record, or `None` if
    /// it does not exist. A rename onto an active sibling's name fails with
    /// `DuplicateName`.
    async fn update(&self, id: FolderId, patch: &FolderPatch) -> AppResult<Option<Folder>>;

    /// Apply a patch to every matching folder. Returns the number changed.
    async fn update_many(&self, query: &FolderQuery, patch: &FolderPatch) -> AppResult<u64>;

    /// Hard-delete folders by id. Returns the number removed.
    async fn delete_many(&self, ids: &[FolderId]) -> AppResult<u64>;
}

/// File metadata persistence.
#[async_trait]
pub trait FileStore: Send + Sync + Debug + 'static {
    /// Fetch one file regardless of trash state.
    async fn get(&self, id: FileId) -> AppResult<Option<File>>;

    /// All files matching `query`, oldest first.
    async fn find(&self, query: &FileQuery) -> AppResult<Vec<File>>;

    /// Persist a new file record.
    async fn insert(&self, data: &CreateFile) -> AppResult<File>;

    /// Apply a patch to one file and return the new record.
    async fn update(&self, id: FileId, patch: &FilePatch) -> AppResult<Option<File>>;

    /// Apply a patch to every matching file. Returns the number changed.
    async fn update_many(&self, query: &FileQuery, patch: &FilePatch) -> AppResult<u64>;

    /// Hard-delete one file record. Returns whether it existed.
    async fn delete(&self, id: FileId) -> AppResult<bool>;
}

/// Share persistence.
#[async_trait]
pub trait ShareStore: Send + Sync + Debug + 'static {
    /// Fetch one share.
    async fn get(&self, id: ShareId) -> AppResult<Option<Share>>;

    /// Look a share up by its public token.
    async fn find_by_token(&self, token: &str) -> AppResult<Option<Share>>;

    /// All shares matching `query`, newest first.
    async fn find(&self, query: &ShareQuery) -> AppResult<Vec<Share>>;

    /// Persist a new share. Fails with `Conflict` if the token is taken.
    async fn insert(&self, data: &CreateShare) -> AppResult<Share>;

    /// Mark every matching unrevoked share as revoked. Returns the number
    /// newly revoked.
    async fn revoke_many(&self, query: &ShareQuery) -> AppResult<u64>;

    /// Atomically bump the download counter and stamp the access time.
    async fn record_access(&self, id: ShareId, at: DateTime<Utc>) -> AppResult<Option<Share>>;

    /// Hard-delete every matching share. Returns the number removed.
    async fn delete_many(&self, query: &ShareQuery) -> AppResult<u64>;
}

/// The three stores, bundled for wiring.
#[derive(Debug, Clone)]
pub struct EntityStores {
    /// Folder store.
    pub folders: Arc<dyn FolderStore>,
    /// File store.
    pub files: Arc<dyn FileStore>,
    /// Share store.
    pub shares: Arc<dyn ShareStore>,
}

impl EntityStores {
    /// Stores backed by PostgreSQL.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            folders: Arc::new(FolderRepository::new(pool.clone())),
            files: Arc::new(FileRepository::new(pool.clone())),
            shares: Arc::new(ShareRepository::new(pool)),
        }
    }

    /// Empty in-process stores.
    pub fn memory() -> Self {
        Self {
            folders: Arc::new(MemoryFolderStore::new()),
            files: Arc::new(MemoryFileStore::new()),
            shares: Arc::new(MemoryShareStore::new()),
        }
    }
}
