//! Share issuance, resolution, accounting, and revocation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use stash_core::error::{AppError, ErrorKind};
use stash_core::result::AppResult;
use stash_core::types::{FileId, ShareId};
use stash_database::{FileStore, ShareStore};
use stash_entity::LifecycleFilter;
use stash_entity::file::{File, FileQuery};
use stash_entity::share::{CreateShare, Share, ShareQuery, ShareState};

use super::link::LinkService;
use crate::deadline::StoreDeadline;
use crate::naming;

/// Attempts at inserting a share before a token collision is reported.
const TOKEN_ATTEMPTS: u32 = 3;

/// Manages share creation, resolution, and revocation.
#[derive(Debug, Clone)]
pub struct ShareService {
    shares: Arc<dyn ShareStore>,
    files: Arc<dyn FileStore>,
    links: Arc<LinkService>,
    deadline: StoreDeadline,
}

impl ShareService {
    /// Creates a new share service.
    pub fn new(
        shares: Arc<dyn ShareStore>,
        files: Arc<dyn FileStore>,
        links: Arc<LinkService>,
        deadline: StoreDeadline,
    ) -> Self {
        Self {
            shares,
            files,
            links,
            deadline,
        }
    }

    /// The link service used for tokens and URLs.
    pub fn links(&self) -> &LinkService {
        &self.links
    }

    /// Issues a new share for an active file.
    ///
    /// An `expires_at` in the past is accepted; such a share resolves as
    /// expired straight away.
    pub async fn create(
        &self,
        file_id: FileId,
        expires_at: Option<DateTime<Utc>>,
    ) -> AppResult<Share> {
        let file = self
            .deadline
            .run(self.files.get(file_id))
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;
        if file.is_trashed() {
            return Err(AppError::invalid_state("Cannot share a file in the trash"));
        }

        let mut attempt = 1;
        let share = loop {
            let data = CreateShare {
                file_id,
                token: self.links.generate_token(),
                expires_at,
            };
            match self.deadline.run(self.shares.insert(&data)).await {
                Ok(share) => break share,
                Err(e) if e.kind == ErrorKind::Conflict && attempt < TOKEN_ATTEMPTS => {
                    warn!(file_id = %file_id, attempt, "Share token collision, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        info!(
            share_id = %share.id,
            file_id = %file_id,
            expires_at = ?share.expires_at,
            "Share created"
        );
        Ok(share)
    }

    /// Validates a token and returns its share.
    ///
    /// Checks run in a fixed order: existence, revocation, expiry, and
    /// finally that the shared file is still active.
    pub async fn resolve(&self, token: &str) -> AppResult<Share> {
        Ok(self.resolve_with_file(token).await?.0)
    }

    /// [`resolve`](Self::resolve), also returning the shared file.
    pub async fn resolve_with_file(&self, token: &str) -> AppResult<(Share, File)> {
        let share = self
            .deadline
            .run(self.shares.find_by_token(token))
            .await?
            .ok_or_else(|| AppError::not_found("Share link not found"))?;

        match share.state_at(Utc::now()) {
            ShareState::Revoked => return Err(AppError::revoked("Share link has been revoked")),
            ShareState::Expired => return Err(AppError::expired("Share link has expired")),
            ShareState::Active => {}
        }

        let file = self
            .deadline
            .run(self.files.get(share.file_id))
            .await?
            .ok_or_else(|| AppError::not_found("Shared file no longer exists"))?;
        if file.is_trashed() {
            return Err(AppError::invalid_state("Shared file is in the trash"));
        }

        Ok((share, file))
    }

    /// Counts one download and stamps the access time.
    pub async fn record_access(&self, share_id: ShareId) -> AppResult<Share> {
        self.deadline
            .run(self.shares.record_access(share_id, Utc::now()))
            .await?
            .ok_or_else(|| AppError::not_found(format!("Share {share_id} not found")))
    }

    /// Revokes every share of a file. Returns how many were newly revoked.
    pub async fn revoke(&self, file_id: FileId) -> AppResult<u64> {
        let revoked = self
            .deadline
            .run(self.shares.revoke_many(&ShareQuery::for_file(file_id)))
            .await?;
        info!(file_id = %file_id, revoked, "Shares revoked");
        Ok(revoked)
    }

    /// All shares of one file, newest first.
    pub async fn list_by_file(&self, file_id: FileId) -> AppResult<Vec<Share>> {
        self.deadline
            .run(self.shares.find(&ShareQuery::for_file(file_id)))
            .await
    }

    /// All shares of every file a tenant owns, trashed files included.
    pub async fn list_by_owner(&self, owner: &str) -> AppResult<Vec<Share>> {
        let owner = naming::owner(owner)?;
        let files = self
            .deadline
            .run(self.files.find(&FileQuery::owned_by(owner).in_lifecycle(LifecycleFilter::Any)))
            .await?;
        if files.is_empty() {
            return Ok(Vec::new());
        }
        let ids = files.into_iter().map(|f| f.id).collect();
        self.deadline
            .run(self.shares.find(&ShareQuery::for_files(ids)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::atomic::{AtomicU32, Ordering};

    use stash_database::memory::{MemoryFileStore, MemoryShareStore};
    use stash_entity::file::CreateFile;

    use super::*;

    /// Share store whose first inserts report a token collision.
    #[derive(Debug)]
    struct CollidingShares {
        inner: MemoryShareStore,
        collisions: AtomicU32,
    }

    #[async_trait]
    impl ShareStore for CollidingShares {
        async fn get(&self, id: ShareId) -> AppResult<Option<Share>> {
            self.inner.get(id).await
        }
        async fn find_by_token(&self, token: &str) -> AppResult<Option<Share>> {
            self.inner.find_by_token(token).await
        }
        async fn find(&self, query: &ShareQuery) -> AppResult<Vec<Share>> {
            self.inner.find(query).await
        }
        async fn insert(&self, data: &CreateShare) -> AppResult<Share> {
            if self.collisions.load(Ordering::SeqCst) > 0 {
                self.collisions.fetch_sub(1, Ordering::SeqCst);
                return Err(AppError::conflict("Share token already in use"));
            }
            self.inner.insert(data).await
        }
        async fn revoke_many(&self, query: &ShareQuery) -> AppResult<u64> {
            self.inner.revoke_many(query).await
        }
        async fn record_access(&self, id: ShareId, at: DateTime<Utc>) -> AppResult<Option<Share>> {
            self.inner.record_access(id, at).await
        }
        async fn delete_many(&self, query: &ShareQuery) -> AppResult<u64> {
            self.inner.delete_many(query).await
        }
    }

    async fn with_file(shares: Arc<dyn ShareStore>) -> (ShareService, Arc<MemoryFileStore>, File) {
        let files = Arc::new(MemoryFileStore::new());
        let file = files
            .insert(&CreateFile {
                owner: "u1".to_string(),
                folder_id: None,
                display_name: "a.txt".to_string(),
                storage_name: "u1/a.txt".to_string(),
                mime_type: "text/plain".to_string(),
                size_bytes: 1,
            })
            .await
            .unwrap();
        let svc = ShareService::new(
            shares,
            files.clone(),
            Arc::new(LinkService::default()),
            StoreDeadline::default(),
        );
        (svc, files, file)
    }

    #[tokio::test]
    async fn test_token_collision_is_retried() {
        let shares = Arc::new(CollidingShares {
            inner: MemoryShareStore::new(),
            collisions: AtomicU32::new(2),
        });
        let (svc, _, file) = with_file(shares).await;
        let share = svc.create(file.id, None).await.unwrap();
        assert_eq!(share.file_id, file.id);
    }

    #[tokio::test]
    async fn test_persistent_collision_surfaces_conflict() {
        let shares = Arc::new(CollidingShares {
            inner: MemoryShareStore::new(),
            collisions: AtomicU32::new(TOKEN_ATTEMPTS),
        });
        let (svc, _, file) = with_file(shares).await;
        let err = svc.create(file.id, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_resolve_order_revoked_before_expired() {
        let (svc, _, file) = with_file(Arc::new(MemoryShareStore::new())).await;
        let share = svc
            .create(file.id, Some(Utc::now() - Duration::seconds(1)))
            .await
            .unwrap();
        assert_eq!(
            svc.resolve(&share.token).await.unwrap_err().kind,
            ErrorKind::Expired
        );
        svc.revoke(file.id).await.unwrap();
        assert_eq!(
            svc.resolve(&share.token).await.unwrap_err().kind,
            ErrorKind::Revoked
        );
    }

    #[tokio::test]
    async fn test_unknown_token_is_not_found() {
        let (svc, _, _) = with_file(Arc::new(MemoryShareStore::new())).await;
        assert_eq!(
            svc.resolve("nope").await.unwrap_err().kind,
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_trashed_file_cannot_be_shared_or_resolved() {
        let (svc, files, file) = with_file(Arc::new(MemoryShareStore::new())).await;
        let share = svc.create(file.id, None).await.unwrap();
        files
            .update(file.id, &stash_entity::file::FilePatch::trash(Utc::now()))
            .await
            .unwrap();

        assert_eq!(
            svc.create(file.id, None).await.unwrap_err().kind,
            ErrorKind::InvalidState
        );
        assert_eq!(
            svc.resolve(&share.token).await.unwrap_err().kind,
            ErrorKind::InvalidState
        );
    }

    #[tokio::test]
    async fn test_list_by_owner_spans_files() {
        let (svc, files, file) = with_file(Arc::new(MemoryShareStore::new())).await;
        let other = files
            .insert(&CreateFile {
                owner: "u1".to_string(),
                folder_id: None,
                display_name: "b.txt".to_string(),
                storage_name: "u1/b.txt".to_string(),
                mime_type: "text/plain".to_string(),
                size_bytes: 1,
            })
            .await
            .unwrap();
        svc.create(file.id, None).await.unwrap();
        svc.create(file.id, None).await.unwrap();
        svc.create(other.id, None).await.unwrap();

        assert_eq!(svc.list_by_owner("u1").await.unwrap().len(), 3);
        assert_eq!(svc.list_by_file(file.id).await.unwrap().len(), 2);
        assert!(svc.list_by_owner("u2").await.unwrap().is_empty());
    }
}
