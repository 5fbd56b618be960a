//! Share entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use stash_core::types::{FileId, ShareId};

/// Lifecycle state of a share, evaluated lazily at access time.
///
/// `Revoked` and `Expired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareState {
    /// The link can be used.
    Active,
    /// The link was revoked explicitly.
    Revoked,
    /// The link's expiry time has passed.
    Expired,
}

/// A public, token-addressed link to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Share {
    /// Unique share identifier.
    pub id: ShareId,
    /// The shared file.
    pub file_id: FileId,
    /// Public token; the only identifier exposed to anonymous users.
    pub token: String,
    /// When the share expires (None = never).
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether the share was revoked.
    pub is_revoked: bool,
    /// Number of recorded downloads.
    pub download_count: i64,
    /// When the share was created.
    pub created_at: DateTime<Utc>,
    /// Last time the share was accessed.
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl Share {
    /// Evaluate the state machine at `now`. Revocation is checked before
    /// expiry, so a revoked share always reports `Revoked`.
    pub fn state_at(&self, now: DateTime<Utc>) -> ShareState {
        if self.is_revoked {
            return ShareState::Revoked;
        }
        match self.expires_at {
            Some(expires_at) if now > expires_at => ShareState::Expired,
            _ => ShareState::Active,
        }
    }
}

/// Data required to create a new share.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShare {
    /// File being shared.
    pub file_id: FileId,
    /// Freshly generated token.
    pub token: String,
    /// Expiry time (None = never).
    pub expires_at: Option<DateTime<Utc>>,
}

impl CreateShare {
    /// Materialize the record a store would persist.
    pub fn into_share(self, id: ShareId, now: DateTime<Utc>) -> Share {
        Share {
            id,
            file_id: self.file_id,
            token: self.token,
            expires_at: self.expires_at,
            is_revoked: false,
            download_count: 0,
            created_at: now,
            last_accessed_at: None,
        }
    }
}

/// Predicate over shares. Every set field must match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShareQuery {
    /// Restrict to shares of these files.
    pub file_ids: Option<Vec<FileId>>,
    /// Restrict to unrevoked shares.
    pub only_unrevoked: bool,
}

impl ShareQuery {
    /// All shares of one file.
    pub fn for_file(file_id: FileId) -> Self {
        Self::for_files(vec![file_id])
    }

    /// All shares of a set of files.
    pub fn for_files(file_ids: Vec<FileId>) -> Self {
        Self {
            file_ids: Some(file_ids),
            only_unrevoked: false,
        }
    }

    /// Evaluate the predicate against one record.
    pub fn matches(&self, share: &Share) -> bool {
        if let Some(ids) = &self.file_ids {
            if !ids.contains(&share.file_id) {
                return false;
            }
        }
        !(self.only_unrevoked && share.is_revoked)
    }
}
