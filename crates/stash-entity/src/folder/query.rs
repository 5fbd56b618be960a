//! Folder selection predicate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stash_core::types::{FolderId, ParentRef};

use super::model::Folder;
use crate::lifecycle::LifecycleFilter;

/// Predicate over folders. Every set field must match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolderQuery {
    /// Restrict to one tenant.
    pub owner: Option<String>,
    /// Restrict to direct children of a parent.
    pub parent: Option<ParentRef>,
    /// Exact name match.
    pub name: Option<String>,
    /// Restrict to a set of ids.
    pub ids: Option<Vec<FolderId>>,
    /// Exclude one id (used for rename uniqueness checks).
    pub exclude: Option<FolderId>,
    /// Trash selection.
    pub lifecycle: LifecycleFilter,
    /// Exact trash stamp, selecting folders trashed by one operation.
    pub trashed_at: Option<DateTime<Utc>>,
}

impl FolderQuery {
    /// Active folders of a tenant.
    pub fn owned_by(owner: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
            ..Self::default()
        }
    }

    /// Direct children of a folder, trashed or not.
    pub fn children_of(parent: FolderId) -> Self {
        Self {
            parent: Some(ParentRef::Folder(parent)),
            lifecycle: LifecycleFilter::Any,
            ..Self::default()
        }
    }

    /// Exactly the given folders.
    pub fn by_ids(ids: Vec<FolderId>) -> Self {
        Self {
            ids: Some(ids),
            lifecycle: LifecycleFilter::Any,
            ..Self::default()
        }
    }

    /// Restrict to direct children of `parent`.
    pub fn under(mut self, parent: ParentRef) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Restrict to an exact name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Exclude one folder.
    pub fn excluding(mut self, id: FolderId) -> Self {
        self.exclude = Some(id);
        self
    }

    /// Select by trash state.
    pub fn in_lifecycle(mut self, lifecycle: LifecycleFilter) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Restrict to folders trashed at exactly `at`.
    pub fn trashed_at(mut self, at: DateTime<Utc>) -> Self {
        self.trashed_at = Some(at);
        self
    }

    /// Evaluate the predicate against one record.
    pub fn matches(&self, folder: &Folder) -> bool {
        if let Some(owner) = &self.owner {
            if &folder.owner != owner {
                return false;
            }
        }
        if let Some(parent) = self.parent {
            if folder.parent() != parent {
                return false;
            }
        }
        if let Some(name) = &self.name {
            if &folder.name != name {
                return false;
            }
        }
        if let Some(ids) = &self.ids {
            if !ids.contains(&folder.id) {
                return false;
            }
        }
        if self.exclude == Some(folder.id) {
            return false;
        }
        if self.trashed_at.is_some() && folder.deleted_at != self.trashed_at {
            return false;
        }
        self.lifecycle.admits(folder.deleted_at)
    }
}
