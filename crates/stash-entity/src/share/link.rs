//! Share link value object.

use serde::{Deserialize, Serialize};

use stash_core::types::{FileId, ShareId};

/// A public link handed to the share's creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLink {
    /// The share ID.
    pub share_id: ShareId,
    /// The shared file.
    pub file_id: FileId,
    /// The full URL for accessing the share.
    pub url: String,
    /// The share token.
    pub token: String,
    /// When the link expires (if set).
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}
