//! In-memory folder store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use stash_core::error::AppError;
use stash_core::result::AppResult;
use stash_core::types::FolderId;
use stash_entity::folder::{CreateFolder, Folder, FolderPatch, FolderQuery};

use crate::store::FolderStore;

/// Folder store backed by a map.
#[derive(Debug, Default)]
pub struct MemoryFolderStore {
    folders: RwLock<HashMap<FolderId, Folder>>,
}

impl MemoryFolderStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Reject the candidate if another active folder already holds its
/// `(owner, parent, name)` slot.
fn check_name_slot(folders: &HashMap<FolderId, Folder>, candidate: &Folder) -> AppResult<()> {
    if candidate.is_trashed() {
        return Ok(());
    }
    let taken = folders.values().any(|other| {
        other.id != candidate.id
            && !other.is_trashed()
            && other.owner == candidate.owner
            && other.parent_id == candidate.parent_id
            && other.name == candidate.name
    });
    if taken {
        return Err(AppError::duplicate_name(format!(
            "Folder '{}' already exists in this location",
            candidate.name
        )));
    }
    Ok(())
}

#[async_trait]
impl FolderStore for MemoryFolderStore {
    async fn get(&self, id: FolderId) -> AppResult<Option<Folder>> {
        Ok(self.folders.read().await.get(&id).cloned())
    }

    async fn find(&self, query: &FolderQuery) -> AppResult<Vec<Folder>> {
        let folders = self.folders.read().await;
        let mut found: Vec<Folder> = folders
            .values()
            .filter(|f| query.matches(f))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name).then(a.created_at.cmp(&b.created_at)));
        Ok(found)
    }

    async fn insert(&self, data: &CreateFolder) -> AppResult<Folder> {
        let folder = data.clone().into_folder(FolderId::new(), Utc::now());
        let mut folders = self.folders.write().await;
        check_name_slot(&folders, &folder)?;
        folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn update(&self, id: FolderId, patch: &FolderPatch) -> AppResult<Option<Folder>> {
        let mut folders = self.folders.write().await;
        let Some(current) = folders.get(&id) else {
            return Ok(None);
        };
        let mut updated = current.clone();
        patch.apply(&mut updated, Utc::now());
        check_name_slot(&folders, &updated)?;
        folders.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn update_many(&self, query: &FolderQuery, patch: &FolderPatch) -> AppResult<u64> {
        let mut folders = self.folders.write().await;
        let now = Utc::now();
        let mut staged = folders.clone();
        let mut changed = Vec::new();
        for folder in staged.values_mut().filter(|f| query.matches(f)) {
            patch.apply(folder, now);
            changed.push(folder.id);
        }
        for id in &changed {
            if let Some(folder) = staged.get(id) {
                check_name_slot(&staged, folder)?;
            }
        }
        *folders = staged;
        Ok(changed.len() as u64)
    }

    async fn delete_many(&self, ids: &[FolderId]) -> AppResult<u64> {
        let mut folders = self.folders.write().await;
        let removed = ids.iter().filter(|id| folders.remove(id).is_some()).count();
        Ok(removed as u64)
    }
}
