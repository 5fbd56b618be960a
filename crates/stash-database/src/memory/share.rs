//! In-memory share store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use stash_core::error::AppError;
use stash_core::result::AppResult;
use stash_core::types::ShareId;
use stash_entity::share::{CreateShare, Share, ShareQuery};

use crate::store::ShareStore;

/// Share store backed by a map.
#[derive(Debug, Default)]
pub struct MemoryShareStore {
    shares: RwLock<HashMap<ShareId, Share>>,
}

impl MemoryShareStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShareStore for MemoryShareStore {
    async fn get(&self, id: ShareId) -> AppResult<Option<Share>> {
        Ok(self.shares.read().await.get(&id).cloned())
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<Share>> {
        let shares = self.shares.read().await;
        Ok(shares.values().find(|s| s.token == token).cloned())
    }

    async fn find(&self, query: &ShareQuery) -> AppResult<Vec<Share>> {
        let shares = self.shares.read().await;
        let mut found: Vec<Share> = shares.values().filter(|s| query.matches(s)).cloned().collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn insert(&self, data: &CreateShare) -> AppResult<Share> {
        let mut shares = self.shares.write().await;
        if shares.values().any(|s| s.token == data.token) {
            return Err(AppError::conflict("Share token already in use"));
        }
        let share = data.clone().into_share(ShareId::new(), Utc::now());
        shares.insert(share.id, share.clone());
        Ok(share)
    }

    async fn revoke_many(&self, query: &ShareQuery) -> AppResult<u64> {
        let mut shares = self.shares.write().await;
        let mut revoked = 0u64;
        for share in shares.values_mut().filter(|s| !s.is_revoked && query.matches(s)) {
            share.is_revoked = true;
            revoked += 1;
        }
        Ok(revoked)
    }

    async fn record_access(&self, id: ShareId, at: DateTime<Utc>) -> AppResult<Option<Share>> {
        let mut shares = self.shares.write().await;
        Ok(shares.get_mut(&id).map(|share| {
            share.download_count += 1;
            share.last_accessed_at = Some(at);
            share.clone()
        }))
    }

    async fn delete_many(&self, query: &ShareQuery) -> AppResult<u64> {
        let mut shares = self.shares.write().await;
        let before = shares.len();
        shares.retain(|_, s| !query.matches(s));
        Ok((before - shares.len()) as u64)
    }
}
