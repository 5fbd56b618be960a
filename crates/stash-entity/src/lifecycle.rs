//! Soft-delete lifecycle selection shared by file and folder queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Selects records by their `deleted_at` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleFilter {
    /// Only records that are not in the trash.
    #[default]
    Active,
    /// Only records that are in the trash.
    Trashed,
    /// Both.
    Any,
}

impl LifecycleFilter {
    /// Whether a record with the given marker is selected.
    pub fn admits(self, deleted_at: Option<DateTime<Utc>>) -> bool {
        match self {
            Self::Active => deleted_at.is_none(),
            Self::Trashed => deleted_at.is_some(),
            Self::Any => true,
        }
    }
}
