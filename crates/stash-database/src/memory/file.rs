//! In-memory file store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use stash_core::result::AppResult;
use stash_core::types::FileId;
use stash_entity::file::{CreateFile, File, FilePatch, FileQuery};

use crate::store::FileStore;

/// File store backed by a map.
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    files: RwLock<HashMap<FileId, File>>,
}

impl MemoryFileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn get(&self, id: FileId) -> AppResult<Option<File>> {
        Ok(self.files.read().await.get(&id).cloned())
    }

    async fn find(&self, query: &FileQuery) -> AppResult<Vec<File>> {
        let files = self.files.read().await;
        let mut found: Vec<File> = files.values().filter(|f| query.matches(f)).cloned().collect();
        found.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.display_name.cmp(&b.display_name))
        });
        Ok(found)
    }

    async fn insert(&self, data: &CreateFile) -> AppResult<File> {
        let file = data.clone().into_file(FileId::new(), Utc::now());
        self.files.write().await.insert(file.id, file.clone());
        Ok(file)
    }

    async fn update(&self, id: FileId, patch: &FilePatch) -> AppResult<Option<File>> {
        let mut files = self.files.write().await;
        Ok(files.get_mut(&id).map(|file| {
            patch.apply(file, Utc::now());
            file.clone()
        }))
    }

    async fn update_many(&self, query: &FileQuery, patch: &FilePatch) -> AppResult<u64> {
        let mut files = self.files.write().await;
        let now = Utc::now();
        let mut changed = 0u64;
        for file in files.values_mut().filter(|f| query.matches(f)) {
            patch.apply(file, now);
            changed += 1;
        }
        Ok(changed)
    }

    async fn delete(&self, id: FileId) -> AppResult<bool> {
        Ok(self.files.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use stash_core::types::{FolderId, ParentRef};
    use stash_entity::LifecycleFilter;

    use super::*;

    fn create(folder_id: Option<FolderId>, name: &str) -> CreateFile {
        CreateFile {
            owner: "u1".to_string(),
            folder_id,
            display_name: name.to_string(),
            storage_name: format!("u1/{name}"),
            mime_type: "text/plain".to_string(),
            size_bytes: 1,
        }
    }

    #[tokio::test]
    async fn test_cascade_style_update_many() {
        let store = MemoryFileStore::new();
        let folder = FolderId::new();
        let a = store.insert(&create(Some(folder), "a.txt")).await.unwrap();
        let b = store.insert(&create(None, "b.txt")).await.unwrap();

        let n = store
            .update_many(
                &FileQuery::in_folder(ParentRef::Folder(folder)),
                &FilePatch::trash(Utc::now()),
            )
            .await
            .unwrap();
        assert_eq!(n, 1);
        assert!(store.get(a.id).await.unwrap().unwrap().is_trashed());
        assert!(!store.get(b.id).await.unwrap().unwrap().is_trashed());

        let trashed = store
            .find(&FileQuery::owned_by("u1").in_lifecycle(LifecycleFilter::Trashed))
            .await
            .unwrap();
        assert_eq!(trashed.len(), 1);
        assert_eq!(trashed[0].folder_id, Some(folder));
    }

    #[tokio::test]
    async fn test_update_missing_and_delete() {
        let store = MemoryFileStore::new();
        assert!(store
            .update(FileId::new(), &FilePatch::restore())
            .await
            .unwrap()
            .is_none());
        let a = store.insert(&create(None, "a.txt")).await.unwrap();
        assert!(store.delete(a.id).await.unwrap());
        assert!(!store.delete(a.id).await.unwrap());
    }
}
