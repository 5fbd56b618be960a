//! File selection predicate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stash_core::types::{FileId, ParentRef};

use super::model::File;
use crate::lifecycle::LifecycleFilter;

/// Predicate over files. Every set field must match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileQuery {
    /// Restrict to one tenant.
    pub owner: Option<String>,
    /// Restrict to direct contents of a folder (or the tenant root).
    pub folder: Option<ParentRef>,
    /// Restrict to a set of ids.
    pub ids: Option<Vec<FileId>>,
    /// Trash selection.
    pub lifecycle: LifecycleFilter,
    /// Exact trash stamp, selecting files trashed by one operation.
    pub trashed_at: Option<DateTime<Utc>>,
}

impl FileQuery {
    /// Active files of a tenant.
    pub fn owned_by(owner: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
            ..Self::default()
        }
    }

    /// Direct contents of a folder, any tenant.
    pub fn in_folder(folder: ParentRef) -> Self {
        Self {
            folder: Some(folder),
            ..Self::default()
        }
    }

    /// Restrict to direct contents of `folder`.
    pub fn under(mut self, folder: ParentRef) -> Self {
        self.folder = Some(folder);
        self
    }

    /// Select by trash state.
    pub fn in_lifecycle(mut self, lifecycle: LifecycleFilter) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Restrict to files trashed at exactly `at`.
    pub fn trashed_at(mut self, at: DateTime<Utc>) -> Self {
        self.trashed_at = Some(at);
        self
    }

    /// Evaluate the predicate against one record.
    pub fn matches(&self, file: &File) -> bool {
        if let Some(owner) = &self.owner {
            if &file.owner != owner {
                return false;
            }
        }
        if let Some(folder) = self.folder {
            if file.parent() != folder {
                return false;
            }
        }
        if let Some(ids) = &self.ids {
            if !ids.contains(&file.id) {
                return false;
            }
        }
        if self.trashed_at.is_some() && file.deleted_at != self.trashed_at {
            return false;
        }
        self.lifecycle.admits(file.deleted_at)
    }
}
