//! Placement of a folder or file within a tenant's tree.

use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::id::FolderId;

/// The literal a caller may pass instead of a folder id to mean "tenant root".
pub const ROOT_SENTINEL: &str = "root";

/// Where a record sits: directly under the tenant root, or inside a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum ParentRef {
    /// The tenant root (`parent_id` / `folder_id` is null).
    Root,
    /// A specific folder.
    Folder(FolderId),
}

impl ParentRef {
    /// Interpret a caller-supplied selector. `None`, an empty string, and
    /// `"root"` all select the tenant root.
    pub fn parse(raw: Option<&str>) -> AppResult<Self> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::Root),
            Some(s) if s.eq_ignore_ascii_case(ROOT_SENTINEL) => Ok(Self::Root),
            Some(s) => FolderId::parse(s).map(Self::Folder),
        }
    }

    /// The nullable column value this placement corresponds to.
    pub fn folder_id(self) -> Option<FolderId> {
        match self {
            Self::Root => None,
            Self::Folder(id) => Some(id),
        }
    }
}

impl From<Option<FolderId>> for ParentRef {
    fn from(id: Option<FolderId>) -> Self {
        id.map_or(Self::Root, Self::Folder)
    }
}
