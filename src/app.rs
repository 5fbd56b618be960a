//! Service wiring for the binary.

use std::sync::Arc;

use tracing::{info, warn};

use stash_core::config::AppConfig;
use stash_core::result::AppResult;
use stash_core::traits::BlobStore;
use stash_database::{DatabasePool, EntityStores};
use stash_service::{
    AccessService, FileService, FolderService, LinkService, ShareService, StoreDeadline,
    TrashService, UploadService,
};
use stash_storage::LocalBlobStore;

/// Every service, wired against PostgreSQL and the local blob store.
#[derive(Debug)]
pub struct App {
    pub folders: Arc<FolderService>,
    pub files: Arc<FileService>,
    pub uploads: UploadService,
    pub shares: Arc<ShareService>,
    pub access: AccessService,
    pub trash: TrashService,
    pool: DatabasePool,
}

impl App {
    /// Connect to the database and blob root named in `config`.
    pub async fn connect(config: &AppConfig) -> AppResult<Self> {
        let pool = DatabasePool::connect(&config.database).await?;
        let stores = EntityStores::postgres(pool.pool().clone());
        let local = LocalBlobStore::new(&config.storage.upload_base_path).await?;
        if !local.health_check().await? {
            warn!(root = %local.root().display(), "Blob store root is unavailable");
        }
        info!(
            provider = local.provider_type(),
            root = %local.root().display(),
            "Blob store ready"
        );
        let blobs: Arc<dyn BlobStore> = Arc::new(local);

        let deadline = StoreDeadline::from_config(&config.store);
        info!(
            timeout_ms = deadline.timeout().as_millis() as u64,
            "Metadata store deadline set"
        );
        let links = Arc::new(LinkService::from_config(&config.share));

        let folders = Arc::new(FolderService::new(
            stores.folders.clone(),
            blobs.clone(),
            deadline,
        ));
        let files = Arc::new(FileService::new(
            stores.files.clone(),
            stores.folders.clone(),
            stores.shares.clone(),
            blobs.clone(),
            deadline,
        ));
        let shares = Arc::new(ShareService::new(
            stores.shares.clone(),
            stores.files.clone(),
            links,
            deadline,
        ));

        Ok(Self {
            uploads: UploadService::new(files.clone(), blobs.clone(), &config.storage),
            access: AccessService::new(shares.clone(), blobs),
            trash: TrashService::new(folders.clone(), files.clone()),
            folders,
            files,
            shares,
            pool,
        })
    }

    /// Release database connections.
    pub async fn close(self) {
        self.pool.close().await;
    }
}
