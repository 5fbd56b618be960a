//! Upload orchestration: write the blob, then register metadata.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use stash_core::config::StorageConfig;
use stash_core::error::AppError;
use stash_core::result::AppResult;
use stash_core::traits::BlobStore;
use stash_core::types::{FileId, ParentRef};
use stash_entity::file::File;

use super::service::{FileService, RegisterFile, ReplaceContent};
use crate::naming;

/// Bytes received from a client.
#[derive(Debug, Clone)]
pub struct UploadContent {
    /// Original file name.
    pub file_name: String,
    /// Declared MIME type; guessed from the name when absent.
    pub mime_type: Option<String>,
    /// The content.
    pub data: Bytes,
}

/// Turns uploaded bytes into file records.
///
/// Bytes always land in the blob store before any record refers to them.
#[derive(Debug, Clone)]
pub struct UploadService {
    files: Arc<FileService>,
    blobs: Arc<dyn BlobStore>,
    max_upload_size_bytes: u64,
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(files: Arc<FileService>, blobs: Arc<dyn BlobStore>, config: &StorageConfig) -> Self {
        Self {
            files,
            blobs,
            max_upload_size_bytes: config.max_upload_size_bytes,
        }
    }

    /// Stores one upload and registers it under `folder`.
    pub async fn ingest(
        &self,
        owner: &str,
        folder: ParentRef,
        content: UploadContent,
    ) -> AppResult<File> {
        let owner = naming::owner(owner)?;
        let display_name = naming::file_name(&content.file_name)?;
        self.check_size(&content)?;

        let mime_type = resolve_mime(&content);
        let size_bytes = content.data.len() as i64;
        let handle = self
            .blobs
            .write(&storage_path(&owner, &display_name), content.data)
            .await?;

        let registered = self
            .files
            .upload(RegisterFile {
                owner,
                storage_name: handle.clone(),
                display_name,
                mime_type,
                size_bytes,
                folder,
            })
            .await;

        match registered {
            Ok(file) => Ok(file),
            Err(e) => {
                warn!(handle = %handle, error = %e, "Upload not registered, discarding blob");
                self.files.discard_blob(&handle).await;
                Err(e)
            }
        }
    }

    /// Stores a batch of uploads in order, stopping at the first failure.
    pub async fn ingest_many(
        &self,
        owner: &str,
        folder: ParentRef,
        contents: Vec<UploadContent>,
    ) -> AppResult<Vec<File>> {
        let mut files = Vec::with_capacity(contents.len());
        for content in contents {
            files.push(self.ingest(owner, folder, content).await?);
        }
        info!(owner, count = files.len(), "Batch upload complete");
        Ok(files)
    }

    /// Stores new content for an existing active file and swaps it in.
    pub async fn ingest_replacement(&self, id: FileId, content: UploadContent) -> AppResult<File> {
        let file = self.files.get_active(id).await?;
        self.check_size(&content)?;

        let mime_type = resolve_mime(&content);
        let size_bytes = content.data.len() as i64;
        let name_for_ext = if content.file_name.trim().is_empty() {
            file.display_name.as_str()
        } else {
            content.file_name.as_str()
        };
        let handle = self
            .blobs
            .write(&storage_path(&file.owner, name_for_ext), content.data)
            .await?;

        let replaced = self
            .files
            .replace_content(
                id,
                ReplaceContent {
                    storage_name: handle.clone(),
                    mime_type,
                    size_bytes,
                },
            )
            .await;

        match replaced {
            Ok(file) => Ok(file),
            Err(e) => {
                warn!(handle = %handle, error = %e, "Replacement not applied, discarding blob");
                self.files.discard_blob(&handle).await;
                Err(e)
            }
        }
    }

    fn check_size(&self, content: &UploadContent) -> AppResult<()> {
        if content.data.len() as u64 > self.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "'{}' exceeds the upload limit of {} bytes",
                content.file_name, self.max_upload_size_bytes
            )));
        }
        Ok(())
    }
}

/// `<owner>/<uuid><.ext>`: unique per upload, keeps the original extension.
fn storage_path(owner: &str, file_name: &str) -> String {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();
    format!("{owner}/{}{ext}", Uuid::new_v4())
}

fn resolve_mime(content: &UploadContent) -> String {
    match content.mime_type.as_deref().map(str::trim) {
        Some(declared) if !declared.is_empty() => declared.to_string(),
        _ => mime_guess::from_path(&content.file_name)
            .first_or_octet_stream()
            .to_string(),
    }
}
