//! File record lifecycle: register, rename, move, replace, trash, restore,
//! purge.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use stash_core::error::AppError;
use stash_core::result::AppResult;
use stash_core::traits::{BlobStore, ByteStream};
use stash_core::types::{FileId, FolderId, ParentRef};
use stash_database::{FileStore, FolderStore, ShareStore};
use stash_entity::LifecycleFilter;
use stash_entity::file::{CreateFile, File, FilePatch, FileQuery};
use stash_entity::share::ShareQuery;

use crate::deadline::StoreDeadline;
use crate::naming;

/// Manages file metadata records.
#[derive(Debug, Clone)]
pub struct FileService {
    files: Arc<dyn FileStore>,
    folders: Arc<dyn FolderStore>,
    shares: Arc<dyn ShareStore>,
    blobs: Arc<dyn BlobStore>,
    deadline: StoreDeadline,
}

/// Metadata for bytes that are already durably stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterFile {
    /// Tenant key.
    pub owner: String,
    /// Blob handle returned by the blob store.
    pub storage_name: String,
    /// Original file name.
    pub display_name: String,
    /// MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// Target folder.
    pub folder: ParentRef,
}

/// Request to rename and/or move a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFileRequest {
    /// New display name.
    pub display_name: Option<String>,
    /// New placement.
    pub folder: Option<ParentRef>,
}

/// New content already written to the blob store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceContent {
    /// Handle of the new blob.
    pub storage_name: String,
    /// MIME type of the new content.
    pub mime_type: String,
    /// Size of the new content.
    pub size_bytes: i64,
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        files: Arc<dyn FileStore>,
        folders: Arc<dyn FolderStore>,
        shares: Arc<dyn ShareStore>,
        blobs: Arc<dyn BlobStore>,
        deadline: StoreDeadline,
    ) -> Self {
        Self {
            files,
            folders,
            shares,
            blobs,
            deadline,
        }
    }

    /// Registers a file whose bytes are already stored under
    /// `req.storage_name`.
    pub async fn upload(&self, req: RegisterFile) -> AppResult<File> {
        let owner = naming::owner(&req.owner)?;
        let display_name = naming::file_name(&req.display_name)?;
        if req.size_bytes < 0 {
            return Err(AppError::validation("File size cannot be negative"));
        }
        if let ParentRef::Folder(folder_id) = req.folder {
            self.require_active_folder(&owner, folder_id).await?;
        }

        let file = self
            .deadline
            .run(self.files.insert(&CreateFile {
                owner,
                folder_id: req.folder.folder_id(),
                display_name,
                storage_name: req.storage_name,
                mime_type: req.mime_type,
                size_bytes: req.size_bytes,
            }))
            .await?;

        info!(
            owner = %file.owner,
            file_id = %file.id,
            name = %file.display_name,
            size = file.size_bytes,
            "File uploaded"
        );

        Ok(file)
    }

    /// Lists active files directly under `folder`.
    pub async fn list(&self, owner: &str, folder: ParentRef) -> AppResult<Vec<File>> {
        let owner = naming::owner(owner)?;
        self.deadline
            .run(self.files.find(&FileQuery::owned_by(owner).under(folder)))
            .await
    }

    /// Every file record directly inside a folder, trashed or not.
    pub async fn contents(&self, folder_id: FolderId) -> AppResult<Vec<File>> {
        self.deadline
            .run(self.files.find(
                &FileQuery::in_folder(ParentRef::Folder(folder_id))
                    .in_lifecycle(LifecycleFilter::Any),
            ))
            .await
    }

    /// Gets a file by ID, trashed or not.
    pub async fn get(&self, id: FileId) -> AppResult<File> {
        self.deadline
            .run(self.files.get(id))
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))
    }

    /// Gets a file that must not be in the trash.
    pub async fn get_active(&self, id: FileId) -> AppResult<File> {
        let file = self.get(id).await?;
        if file.is_trashed() {
            return Err(AppError::invalid_state(format!("File {id} is in the trash")));
        }
        Ok(file)
    }

    /// Renames and/or moves a file. The blob is not moved.
    pub async fn update_metadata(&self, id: FileId, req: UpdateFileRequest) -> AppResult<File> {
        let file = self.get_active(id).await?;

        let mut patch = FilePatch::default();
        if let Some(raw) = req.display_name {
            patch.display_name = Some(naming::file_name(&raw)?);
        }
        if let Some(folder) = req.folder {
            if let ParentRef::Folder(folder_id) = folder {
                self.require_active_folder(&file.owner, folder_id).await?;
            }
            patch.folder_id = Some(folder.folder_id());
        }
        if patch.is_empty() {
            return Ok(file);
        }

        let updated = self.apply(id, &patch).await?;
        info!(
            file_id = %id,
            name = %updated.display_name,
            folder_id = ?updated.folder_id,
            "File metadata updated"
        );
        Ok(updated)
    }

    /// Points the record at new content and drops the old blob.
    ///
    /// Deleting the old blob is best effort: a failure is logged and the
    /// replace still succeeds.
    pub async fn replace_content(&self, id: FileId, content: ReplaceContent) -> AppResult<File> {
        let file = self.get_active(id).await?;
        if content.size_bytes < 0 {
            return Err(AppError::validation("File size cannot be negative"));
        }

        let patch = FilePatch {
            storage_name: Some(content.storage_name),
            mime_type: Some(content.mime_type),
            size_bytes: Some(content.size_bytes),
            ..FilePatch::default()
        };
        let updated = self.apply(id, &patch).await?;

        if file.storage_name != updated.storage_name {
            self.discard_blob(&file.storage_name).await;
        }

        info!(file_id = %id, size = updated.size_bytes, "File content replaced");
        Ok(updated)
    }

    /// Moves a file to the trash. Its folder is remembered for restore.
    pub async fn soft_delete(&self, id: FileId) -> AppResult<File> {
        let file = self.get(id).await?;
        if file.is_trashed() {
            return Ok(file);
        }
        let updated = self.apply(id, &FilePatch::trash(Utc::now())).await?;
        info!(file_id = %id, "File moved to trash");
        Ok(updated)
    }

    /// Takes a file out of the trash.
    ///
    /// Fails with `InvalidState` while its folder is trashed or gone; the
    /// folder is never restored implicitly.
    pub async fn restore(&self, id: FileId) -> AppResult<File> {
        let file = self.get(id).await?;
        if !file.is_trashed() {
            return Ok(file);
        }
        if let Some(folder_id) = file.folder_id {
            match self.deadline.run(self.folders.get(folder_id)).await? {
                Some(folder) if !folder.is_trashed() => {}
                Some(_) => {
                    return Err(AppError::invalid_state(
                        "Cannot restore a file whose folder is in the trash",
                    ));
                }
                None => {
                    return Err(AppError::invalid_state(
                        "Cannot restore a file whose folder no longer exists",
                    ));
                }
            }
        }
        let updated = self.apply(id, &FilePatch::restore()).await?;
        info!(file_id = %id, "File restored");
        Ok(updated)
    }

    /// Destroys a file: blob first, then its shares, then the record.
    ///
    /// A blob that is already gone is not an error. Any other blob failure
    /// aborts before the record is touched.
    pub async fn permanent_delete(&self, id: FileId) -> AppResult<()> {
        let file = self.get(id).await?;

        let blob_existed = self.blobs.delete(&file.storage_name).await?;
        if !blob_existed {
            debug!(file_id = %id, handle = %file.storage_name, "Blob already absent");
        }

        let shares_removed = self
            .deadline
            .run(self.shares.delete_many(&ShareQuery::for_file(id)))
            .await?;
        self.deadline.run(self.files.delete(id)).await?;

        info!(file_id = %id, shares_removed, "File purged");
        Ok(())
    }

    /// Lists every trashed file of a tenant.
    pub async fn list_deleted(&self, owner: &str) -> AppResult<Vec<File>> {
        let owner = naming::owner(owner)?;
        self.deadline
            .run(self.files.find(
                &FileQuery::owned_by(owner).in_lifecycle(LifecycleFilter::Trashed),
            ))
            .await
    }

    /// Trashes every active file directly inside `folder_id`, stamping them
    /// with `at` (the folder's own trash stamp).
    pub async fn cascade_soft_delete_by_folder(
        &self,
        folder_id: FolderId,
        at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let count = self
            .deadline
            .run(self.files.update_many(
                &FileQuery::in_folder(ParentRef::Folder(folder_id))
                    .in_lifecycle(LifecycleFilter::Active),
                &FilePatch::trash(at),
            ))
            .await?;
        debug!(folder_id = %folder_id, count, "Cascaded trash to files");
        Ok(count)
    }

    /// Restores the files directly inside `folder_id` that were trashed at
    /// `trashed_at`. Files trashed at any other time stay in the trash.
    pub async fn cascade_restore_by_folder(
        &self,
        folder_id: FolderId,
        trashed_at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let count = self
            .deadline
            .run(self.files.update_many(
                &FileQuery::in_folder(ParentRef::Folder(folder_id))
                    .in_lifecycle(LifecycleFilter::Trashed)
                    .trashed_at(trashed_at),
                &FilePatch::restore(),
            ))
            .await?;
        debug!(folder_id = %folder_id, count, "Cascaded restore to files");
        Ok(count)
    }

    /// Opens an active file's content for download.
    pub async fn open_content(&self, id: FileId) -> AppResult<(File, ByteStream)> {
        let file = self.get_active(id).await?;
        let stream = self.blobs.open_for_read(&file.storage_name).await?;
        Ok((file, stream))
    }

    /// Delete a blob that no record points at any more, logging failures.
    pub(crate) async fn discard_blob(&self, handle: &str) {
        match self.blobs.delete(handle).await {
            Ok(_) => debug!(handle, "Discarded blob"),
            Err(e) => warn!(handle, error = %e, "Failed to discard blob"),
        }
    }

    async fn apply(&self, id: FileId, patch: &FilePatch) -> AppResult<File> {
        self.deadline
            .run(self.files.update(id, patch))
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))
    }

    async fn require_active_folder(&self, owner: &str, folder_id: FolderId) -> AppResult<()> {
        let folder = self
            .deadline
            .run(self.folders.get(folder_id))
            .await?
            .filter(|f| f.owner == owner)
            .ok_or_else(|| AppError::not_found("Folder not found"))?;
        if folder.is_trashed() {
            return Err(AppError::invalid_state(
                "Cannot place a file inside a trashed folder",
            ));
        }
        Ok(())
    }
}
