//! Folder CRUD and cascading soft-delete, restore, and purge.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use stash_core::error::AppError;
use stash_core::result::AppResult;
use stash_core::traits::BlobStore;
use stash_core::types::{FolderId, ParentRef};
use stash_database::FolderStore;
use stash_entity::LifecycleFilter;
use stash_entity::folder::{CreateFolder, Folder, FolderPatch, FolderQuery};

use super::tree::collect_descendants;
use crate::deadline::StoreDeadline;
use crate::naming;

/// Manages the per-tenant folder tree.
#[derive(Debug, Clone)]
pub struct FolderService {
    /// Folder store.
    folders: Arc<dyn FolderStore>,
    /// Blob store, used to create each folder's physical directory.
    blobs: Arc<dyn BlobStore>,
    /// Bound on each store call.
    deadline: StoreDeadline,
}

/// Request to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    /// Tenant key.
    pub owner: String,
    /// Folder name.
    pub name: String,
    /// Where to create it.
    pub parent: ParentRef,
    /// Optional description.
    pub description: Option<String>,
}

/// Request to rename or re-describe a folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFolderRequest {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
}

/// A folder together with every folder below it.
#[derive(Debug, Clone)]
pub struct Subtree {
    /// The folder the operation targeted, in its post-operation state.
    pub root: Folder,
    /// Ids of all descendant folders, breadth-first.
    pub descendants: Vec<FolderId>,
}

impl Subtree {
    /// The root id followed by every descendant id.
    pub fn folder_ids(&self) -> Vec<FolderId> {
        let mut ids = Vec::with_capacity(self.descendants.len() + 1);
        ids.push(self.root.id);
        ids.extend_from_slice(&self.descendants);
        ids
    }
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(
        folders: Arc<dyn FolderStore>,
        blobs: Arc<dyn BlobStore>,
        deadline: StoreDeadline,
    ) -> Self {
        Self {
            folders,
            blobs,
            deadline,
        }
    }

    /// Creates a folder.
    ///
    /// The physical directory is created before the record is written, so a
    /// failed `ensure_directory` leaves no metadata behind.
    pub async fn create(&self, req: CreateFolderRequest) -> AppResult<Folder> {
        let owner = naming::owner(&req.owner)?;
        let name = naming::folder_name(&req.name)?;

        let physical_path = match req.parent {
            ParentRef::Root => format!("{owner}/{name}"),
            ParentRef::Folder(parent_id) => {
                let parent = self
                    .deadline
                    .run(self.folders.get(parent_id))
                    .await?
                    .filter(|p| p.owner == owner)
                    .ok_or_else(|| AppError::not_found("Parent folder not found"))?;
                if parent.is_trashed() {
                    return Err(AppError::invalid_state(
                        "Cannot create a folder inside a trashed folder",
                    ));
                }
                format!("{}/{name}", parent.physical_path)
            }
        };

        self.ensure_name_free(&owner, req.parent, &name, None).await?;

        self.blobs.ensure_directory(&physical_path).await?;

        let folder = self
            .deadline
            .run(self.folders.insert(&CreateFolder {
                owner,
                name,
                parent_id: req.parent.folder_id(),
                physical_path,
                description: req.description.unwrap_or_default(),
            }))
            .await?;

        info!(
            owner = %folder.owner,
            folder_id = %folder.id,
            path = %folder.physical_path,
            "Folder created"
        );

        Ok(folder)
    }

    /// Gets a folder by ID, trashed or not.
    pub async fn get(&self, id: FolderId) -> AppResult<Folder> {
        self.deadline
            .run(self.folders.get(id))
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
    }

    /// Renames a folder and/or changes its description.
    ///
    /// The physical path is fixed at creation and does not follow renames.
    pub async fn update(&self, id: FolderId, req: UpdateFolderRequest) -> AppResult<Folder> {
        let folder = self.get(id).await?;
        if folder.is_trashed() {
            return Err(AppError::invalid_state("Cannot update a trashed folder"));
        }

        let mut patch = FolderPatch {
            description: req.description,
            ..FolderPatch::default()
        };
        if let Some(raw) = req.name {
            let name = naming::folder_name(&raw)?;
            if name != folder.name {
                self.ensure_name_free(&folder.owner, folder.parent(), &name, Some(id))
                    .await?;
                patch.name = Some(name);
            }
        }
        if patch.is_empty() {
            return Ok(folder);
        }

        let updated = self
            .deadline
            .run(self.folders.update(id, &patch))
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;

        info!(folder_id = %id, name = %updated.name, "Folder updated");
        Ok(updated)
    }

    /// Moves a folder and its whole subtree to the trash.
    ///
    /// Files inside the subtree are not touched; see
    /// [`TrashService`](crate::TrashService) for the composed cascade.
    pub async fn soft_delete(&self, id: FolderId) -> AppResult<Folder> {
        Ok(self.soft_delete_subtree(id).await?.root)
    }

    /// [`soft_delete`](Self::soft_delete), also returning the descendant ids.
    ///
    /// The root and every descendant trashed by this call share one stamp.
    /// A root that is already in the trash keeps its stamp, and any still
    /// active descendants join it.
    pub async fn soft_delete_subtree(&self, id: FolderId) -> AppResult<Subtree> {
        let folder = self.get(id).await?;
        let descendants = collect_descendants(self.folders.as_ref(), &self.deadline, id).await?;

        let root = match folder.deleted_at {
            Some(_) => folder,
            None => self
                .deadline
                .run(self.folders.update(id, &FolderPatch::trash(Utc::now())))
                .await?
                .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?,
        };
        let stamp = root
            .deleted_at
            .ok_or_else(|| AppError::internal(format!("Folder {id} was not stamped")))?;

        let trashed = if descendants.is_empty() {
            0
        } else {
            self.deadline
                .run(self.folders.update_many(
                    &FolderQuery::by_ids(descendants.clone()).in_lifecycle(LifecycleFilter::Active),
                    &FolderPatch::trash(stamp),
                ))
                .await?
        };

        info!(
            folder_id = %id,
            descendants = descendants.len(),
            newly_trashed = trashed,
            "Folder moved to trash"
        );

        Ok(Subtree { root, descendants })
    }

    /// Takes a folder out of the trash, together with the descendants that
    /// were trashed along with it.
    ///
    /// Descendants trashed on their own before the folder stay in the trash.
    /// The parent must be active: restoring below a trashed or purged
    /// folder fails with `InvalidState`. If an active sibling has taken the
    /// folder's name in the meantime the restore fails with `DuplicateName`.
    pub async fn restore(&self, id: FolderId) -> AppResult<Folder> {
        Ok(self.restore_subtree(id).await?.root)
    }

    /// [`restore`](Self::restore), also returning the descendant ids.
    ///
    /// The root is restored first. If the descendants then fail, the root is
    /// put back in the trash under its old stamp so the call can be retried.
    pub async fn restore_subtree(&self, id: FolderId) -> AppResult<Subtree> {
        let folder = self.get(id).await?;
        let Some(stamp) = folder.deleted_at else {
            return self.subtree(id).await;
        };

        if let Some(parent_id) = folder.parent_id {
            match self.deadline.run(self.folders.get(parent_id)).await? {
                None => {
                    return Err(AppError::invalid_state(
                        "Cannot restore a folder whose parent no longer exists",
                    ));
                }
                Some(parent) if parent.is_trashed() => {
                    return Err(AppError::invalid_state(
                        "Cannot restore a folder whose parent is in the trash",
                    ));
                }
                Some(_) => {}
            }
        }
        self.ensure_name_free(&folder.owner, folder.parent(), &folder.name, Some(id))
            .await?;

        let descendants = collect_descendants(self.folders.as_ref(), &self.deadline, id).await?;
        let root = self
            .deadline
            .run(self.folders.update(id, &FolderPatch::restore()))
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;

        let restored = if descendants.is_empty() {
            0
        } else {
            let query = FolderQuery::by_ids(descendants.clone())
                .in_lifecycle(LifecycleFilter::Trashed)
                .trashed_at(stamp);
            match self
                .deadline
                .run(self.folders.update_many(&query, &FolderPatch::restore()))
                .await
            {
                Ok(count) => count,
                Err(e) => {
                    self.retrash(id, stamp).await;
                    return Err(e);
                }
            }
        };

        info!(
            folder_id = %id,
            descendants = descendants.len(),
            newly_restored = restored,
            "Folder restored"
        );

        Ok(Subtree { root, descendants })
    }

    /// Removes a folder record and every descendant folder record.
    ///
    /// Files are not touched. Returns the number of folder records removed.
    pub async fn permanent_delete(&self, id: FolderId) -> AppResult<u64> {
        let subtree = self.subtree(id).await?;
        let removed = self
            .deadline
            .run(self.folders.delete_many(&subtree.folder_ids()))
            .await?;

        info!(folder_id = %id, removed, "Folder purged");
        Ok(removed)
    }

    /// Look up a folder and its descendants without changing anything.
    pub async fn subtree(&self, id: FolderId) -> AppResult<Subtree> {
        let root = self.get(id).await?;
        let descendants = collect_descendants(self.folders.as_ref(), &self.deadline, id).await?;
        Ok(Subtree { root, descendants })
    }

    /// Lists active folders directly under `parent`.
    pub async fn list(&self, owner: &str, parent: ParentRef) -> AppResult<Vec<Folder>> {
        let owner = naming::owner(owner)?;
        self.deadline
            .run(self.folders.find(&FolderQuery::owned_by(owner).under(parent)))
            .await
    }

    /// Lists every trashed folder of a tenant, at any depth.
    pub async fn list_deleted(&self, owner: &str) -> AppResult<Vec<Folder>> {
        let owner = naming::owner(owner)?;
        self.deadline
            .run(self.folders.find(
                &FolderQuery::owned_by(owner).in_lifecycle(LifecycleFilter::Trashed),
            ))
            .await
    }

    /// Put a folder back in the trash after a failed restore, logging failures.
    async fn retrash(&self, id: FolderId, stamp: DateTime<Utc>) {
        match self
            .deadline
            .run(self.folders.update(id, &FolderPatch::trash(stamp)))
            .await
        {
            Ok(_) => warn!(folder_id = %id, "Restore rolled back"),
            Err(e) => warn!(folder_id = %id, error = %e, "Failed to roll back restore"),
        }
    }

    async fn ensure_name_free(
        &self,
        owner: &str,
        parent: ParentRef,
        name: &str,
        exclude: Option<FolderId>,
    ) -> AppResult<()> {
        let mut query = FolderQuery::owned_by(owner).under(parent).named(name);
        if let Some(id) = exclude {
            query = query.excluding(id);
        }
        let clash = self.deadline.run(self.folders.find(&query)).await?;
        if !clash.is_empty() {
            return Err(AppError::duplicate_name(format!(
                "Folder '{name}' already exists in this location"
            )));
        }
        Ok(())
    }
}
