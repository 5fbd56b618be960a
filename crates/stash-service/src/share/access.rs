//! Anonymous download through a share token.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use stash_core::result::AppResult;
use stash_core::traits::{BlobStore, ByteStream};
use stash_entity::file::File;
use stash_entity::share::Share;

use super::service::ShareService;

/// A resolved share ready to stream.
pub struct SharedDownload {
    /// The share, with the access already counted.
    pub share: Share,
    /// The shared file.
    pub file: File,
    /// The file's bytes.
    pub stream: ByteStream,
}

impl fmt::Debug for SharedDownload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedDownload")
            .field("share", &self.share)
            .field("file", &self.file)
            .finish_non_exhaustive()
    }
}

/// Serves public share downloads.
#[derive(Debug, Clone)]
pub struct AccessService {
    shares: Arc<ShareService>,
    blobs: Arc<dyn BlobStore>,
}

impl AccessService {
    /// Creates a new access service.
    pub fn new(shares: Arc<ShareService>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { shares, blobs }
    }

    /// Resolve a token, count the download, and open the file's bytes.
    pub async fn open(&self, token: &str) -> AppResult<SharedDownload> {
        let (share, file) = self.shares.resolve_with_file(token).await?;
        let share = self.shares.record_access(share.id).await?;
        let stream = self.blobs.open_for_read(&file.storage_name).await?;

        info!(
            share_id = %share.id,
            file_id = %file.id,
            downloads = share.download_count,
            "Shared file opened"
        );

        Ok(SharedDownload {
            share,
            file,
            stream,
        })
    }
}
