//! Trash operations that keep folders and the files inside them in step.
//!
//! [`FolderService`] and [`FileService`] cascade independently; the methods
//! here pair the folder cascade with the per-folder file cascade over the
//! whole subtree.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use stash_core::error::AppError;
use stash_core::result::AppResult;
use stash_core::types::{FileId, FolderId};
use stash_entity::file::File;
use stash_entity::folder::Folder;

use crate::file::FileService;
use crate::folder::FolderService;

/// Everything a tenant has in the trash.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TrashListing {
    /// Trashed folders, any depth.
    pub folders: Vec<Folder>,
    /// Trashed files, any folder.
    pub files: Vec<File>,
}

impl TrashListing {
    /// Whether the trash holds nothing.
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }
}

/// Result of a subtree trash or restore.
#[derive(Debug, Clone, Serialize)]
pub struct CascadeOutcome {
    /// The targeted folder after the operation.
    pub folder: Folder,
    /// Folders in the subtree, root included.
    pub folders: usize,
    /// Files whose state changed.
    pub files: u64,
}

/// Result of a subtree purge.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PurgeOutcome {
    /// Folder records removed.
    pub folders: u64,
    /// File records removed.
    pub files: u64,
}

/// Composes folder and file cascades.
#[derive(Debug, Clone)]
pub struct TrashService {
    folders: Arc<FolderService>,
    files: Arc<FileService>,
}

impl TrashService {
    /// Creates a new trash service.
    pub fn new(folders: Arc<FolderService>, files: Arc<FileService>) -> Self {
        Self { folders, files }
    }

    /// Trash a folder, its descendants, and every file inside them.
    ///
    /// Files share the folder's trash stamp, which is how
    /// [`restore_folder`](Self::restore_folder) finds them again.
    pub async fn trash_folder(&self, id: FolderId) -> AppResult<CascadeOutcome> {
        let subtree = self.folders.soft_delete_subtree(id).await?;
        let stamp = subtree
            .root
            .deleted_at
            .ok_or_else(|| AppError::internal(format!("Folder {id} was not stamped")))?;
        let mut files = 0;
        for folder_id in subtree.folder_ids() {
            files += self
                .files
                .cascade_soft_delete_by_folder(folder_id, stamp)
                .await?;
        }
        info!(folder_id = %id, files, "Folder subtree and contents trashed");
        Ok(CascadeOutcome {
            folders: subtree.descendants.len() + 1,
            folder: subtree.root,
            files,
        })
    }

    /// Restore a folder together with the folders and files that were
    /// trashed along with it.
    pub async fn restore_folder(&self, id: FolderId) -> AppResult<CascadeOutcome> {
        let stamp = self.folders.get(id).await?.deleted_at;
        let subtree = self.folders.restore_subtree(id).await?;
        let mut files = 0;
        if let Some(stamp) = stamp {
            for folder_id in subtree.folder_ids() {
                files += self.files.cascade_restore_by_folder(folder_id, stamp).await?;
            }
        }
        info!(folder_id = %id, files, "Folder subtree and contents restored");
        Ok(CascadeOutcome {
            folders: subtree.descendants.len() + 1,
            folder: subtree.root,
            files,
        })
    }

    /// Destroy a folder subtree together with every file inside it.
    ///
    /// Files go first (blob, shares, record), then the folder records. A
    /// failure part-way leaves the remaining folders and files in place; the
    /// call can be repeated.
    pub async fn purge_folder(&self, id: FolderId) -> AppResult<PurgeOutcome> {
        let subtree = self.folders.subtree(id).await?;
        let mut files = 0;
        for folder_id in subtree.folder_ids() {
            for file in self.files.contents(folder_id).await? {
                self.files.permanent_delete(file.id).await?;
                files += 1;
            }
        }
        let folders = self.folders.permanent_delete(id).await?;
        info!(folder_id = %id, folders, files, "Folder subtree purged");
        Ok(PurgeOutcome { folders, files })
    }

    /// Destroy one file.
    pub async fn purge_file(&self, id: FileId) -> AppResult<()> {
        self.files.permanent_delete(id).await
    }

    /// Everything a tenant has in the trash.
    pub async fn list(&self, owner: &str) -> AppResult<TrashListing> {
        Ok(TrashListing {
            folders: self.folders.list_deleted(owner).await?,
            files: self.files.list_deleted(owner).await?,
        })
    }
}
