//! File entity model.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use stash_core::types::{FileId, FolderId, ParentRef};

/// A file's metadata record. The bytes live in the blob store under
/// `storage_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: FileId,
    /// Tenant key owning this file.
    pub owner: String,
    /// Containing folder (None for the tenant root). Kept while trashed so
    /// that restore puts the file back where it was.
    pub folder_id: Option<FolderId>,
    /// The user-visible file name.
    pub display_name: String,
    /// Opaque blob handle.
    pub storage_name: String,
    /// MIME type of the content.
    pub mime_type: String,
    /// Content size in bytes.
    pub size_bytes: i64,
    /// When the file was uploaded.
    pub created_at: DateTime<Utc>,
    /// When the file was last updated.
    pub updated_at: DateTime<Utc>,
    /// When the file was moved to the trash (None while active).
    pub deleted_at: Option<DateTime<Utc>>,
}

impl File {
    /// Check if the file is in the trash.
    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// The file's placement.
    pub fn parent(&self) -> ParentRef {
        self.folder_id.into()
    }
}

/// Data required to create a new file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    /// Tenant key.
    pub owner: String,
    /// Containing folder.
    pub folder_id: Option<FolderId>,
    /// The user-visible name.
    pub display_name: String,
    /// Blob handle the bytes were already written to.
    pub storage_name: String,
    /// MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size_bytes: i64,
}

impl CreateFile {
    /// Materialize the record a store would persist.
    pub fn into_file(self, id: FileId, now: DateTime<Utc>) -> File {
        File {
            id,
            owner: self.owner,
            folder_id: self.folder_id,
            display_name: self.display_name,
            storage_name: self.storage_name,
            mime_type: self.mime_type,
            size_bytes: self.size_bytes,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Partial update of a file. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePatch {
    /// New display name.
    pub display_name: Option<String>,
    /// New placement (`Some(None)` moves to the tenant root).
    pub folder_id: Option<Option<FolderId>>,
    /// New blob handle.
    pub storage_name: Option<String>,
    /// New MIME type.
    pub mime_type: Option<String>,
    /// New size.
    pub size_bytes: Option<i64>,
    /// New trash marker (`Some(None)` restores).
    pub deleted_at: Option<Option<DateTime<Utc>>>,
}

impl FilePatch {
    /// A patch that moves files to the trash at `at`.
    ///
    /// The stamp is truncated to microseconds, the precision PostgreSQL
    /// stores, so it compares equal after a round-trip.
    pub fn trash(at: DateTime<Utc>) -> Self {
        Self {
            deleted_at: Some(Some(at.trunc_subsecs(6))),
            ..Self::default()
        }
    }

    /// A patch that takes files out of the trash.
    pub fn restore() -> Self {
        Self {
            deleted_at: Some(None),
            ..Self::default()
        }
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.folder_id.is_none()
            && self.storage_name.is_none()
            && self.mime_type.is_none()
            && self.size_bytes.is_none()
            && self.deleted_at.is_none()
    }

    /// Apply the patch in place, stamping `updated_at`.
    pub fn apply(&self, file: &mut File, now: DateTime<Utc>) {
        if let Some(name) = &self.display_name {
            file.display_name = name.clone();
        }
        if let Some(folder_id) = self.folder_id {
            file.folder_id = folder_id;
        }
        if let Some(storage_name) = &self.storage_name {
            file.storage_name = storage_name.clone();
        }
        if let Some(mime_type) = &self.mime_type {
            file.mime_type = mime_type.clone();
        }
        if let Some(size) = self.size_bytes {
            file.size_bytes = size;
        }
        if let Some(deleted_at) = self.deleted_at {
            file.deleted_at = deleted_at;
        }
        file.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &str) -> File {
        CreateFile {
            owner: "u1".to_string(),
            folder_id: None,
            display_name: name.to_string(),
            storage_name: "u1/blob".to_string(),
            mime_type: "text/plain".to_string(),
            size_bytes: 3,
        }
        .into_file(FileId::new(), Utc::now())
    }

    #[test]
    fn test_patch_moves_to_root_and_keeps_other_fields() {
        let mut file = sample("a.txt");
        file.folder_id = Some(FolderId::new());
        let patch = FilePatch {
            folder_id: Some(None),
            ..FilePatch::default()
        };
        patch.apply(&mut file, Utc::now());
        assert_eq!(file.folder_id, None);
        assert_eq!(file.display_name, "a.txt");
    }

    #[test]
    fn test_trash_then_restore() {
        let mut file = sample("a.txt");
        let folder = Some(FolderId::new());
        file.folder_id = folder;
        FilePatch::trash(Utc::now()).apply(&mut file, Utc::now());
        assert!(file.is_trashed());
        assert_eq!(file.folder_id, folder);
        FilePatch::restore().apply(&mut file, Utc::now());
        assert!(!file.is_trashed());
    }
}
