//! Folder entity model.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use stash_core::types::{FolderId, ParentRef};

/// A folder in a tenant's tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: FolderId,
    /// Tenant key owning this folder.
    pub owner: String,
    /// Folder name, unique among active siblings.
    pub name: String,
    /// Parent folder (None for tenant-root folders).
    pub parent_id: Option<FolderId>,
    /// Blob-store directory created for this folder. Fixed at creation.
    pub physical_path: String,
    /// Free-form description.
    pub description: String,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
    /// When the folder was moved to the trash (None while active).
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Folder {
    /// Check if the folder is in the trash.
    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// The folder's placement.
    pub fn parent(&self) -> ParentRef {
        self.parent_id.into()
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// Tenant key.
    pub owner: String,
    /// Folder name.
    pub name: String,
    /// Parent folder (None for tenant root).
    pub parent_id: Option<FolderId>,
    /// Blob-store directory.
    pub physical_path: String,
    /// Description (empty when not given).
    pub description: String,
}

impl CreateFolder {
    /// Materialize the record a store would persist.
    pub fn into_folder(self, id: FolderId, now: DateTime<Utc>) -> Folder {
        Folder {
            id,
            owner: self.owner,
            name: self.name,
            parent_id: self.parent_id,
            physical_path: self.physical_path,
            description: self.description,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Partial update of a folder. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderPatch {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New trash marker (`Some(None)` restores).
    pub deleted_at: Option<Option<DateTime<Utc>>>,
}

impl FolderPatch {
    /// A patch that moves folders to the trash at `at`.
    ///
    /// The stamp is truncated to microseconds, the precision PostgreSQL
    /// stores, so it compares equal after a round-trip.
    pub fn trash(at: DateTime<Utc>) -> Self {
        Self {
            deleted_at: Some(Some(at.trunc_subsecs(6))),
            ..Self::default()
        }
    }

    /// A patch that takes folders out of the trash.
    pub fn restore() -> Self {
        Self {
            deleted_at: Some(None),
            ..Self::default()
        }
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.deleted_at.is_none()
    }

    /// Apply the patch in place, stamping `updated_at`.
    pub fn apply(&self, folder: &mut Folder, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            folder.name = name.clone();
        }
        if let Some(description) = &self.description {
            folder.description = description.clone();
        }
        if let Some(deleted_at) = self.deleted_at {
            folder.deleted_at = deleted_at;
        }
        folder.updated_at = now;
    }
}
