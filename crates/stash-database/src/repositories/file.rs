//! File repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};

use stash_core::result::AppResult;
use stash_core::types::{FileId, ParentRef, raw_uuids};
use stash_entity::LifecycleFilter;
use stash_entity::file::{CreateFile, File, FilePatch, FileQuery};

use crate::error::db_error;
use crate::store::FileStore;

/// Repository for the `files` table.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, query: &FileQuery) {
    if let Some(owner) = &query.owner {
        qb.push(" AND owner = ").push_bind(owner.clone());
    }
    match query.folder {
        Some(ParentRef::Root) => {
            qb.push(" AND folder_id IS NULL");
        }
        Some(ParentRef::Folder(folder)) => {
            qb.push(" AND folder_id = ").push_bind(folder);
        }
        None => {}
    }
    if let Some(ids) = &query.ids {
        qb.push(" AND id = ANY(").push_bind(raw_uuids(ids)).push(")");
    }
    match query.lifecycle {
        LifecycleFilter::Active => {
            qb.push(" AND deleted_at IS NULL");
        }
        LifecycleFilter::Trashed => {
            qb.push(" AND deleted_at IS NOT NULL");
        }
        LifecycleFilter::Any => {}
    }
    if let Some(at) = query.trashed_at {
        qb.push(" AND deleted_at = ").push_bind(at);
    }
}

fn push_patch(qb: &mut QueryBuilder<'_, Postgres>, patch: &FilePatch) {
    qb.push("UPDATE files SET updated_at = ").push_bind(Utc::now());
    if let Some(name) = &patch.display_name {
        qb.push(", display_name = ").push_bind(name.clone());
    }
    if let Some(folder_id) = patch.folder_id {
        qb.push(", folder_id = ").push_bind(folder_id);
    }
    if let Some(storage_name) = &patch.storage_name {
        qb.push(", storage_name = ").push_bind(storage_name.clone());
    }
    if let Some(mime_type) = &patch.mime_type {
        qb.push(", mime_type = ").push_bind(mime_type.clone());
    }
    if let Some(size) = patch.size_bytes {
        qb.push(", size_bytes = ").push_bind(size);
    }
    if let Some(deleted_at) = patch.deleted_at {
        qb.push(", deleted_at = ").push_bind(deleted_at);
    }
}

#[async_trait]
impl FileStore for FileRepository {
    async fn get(&self, id: FileId) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find file", e))
    }

    async fn find(&self, query: &FileQuery) -> AppResult<Vec<File>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM files WHERE TRUE");
        push_filter(&mut qb, query);
        qb.push(" ORDER BY created_at ASC, display_name ASC");

        qb.build_query_as::<File>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list files", e))
    }

    async fn insert(&self, data: &CreateFile) -> AppResult<File> {
        let now = Utc::now();
        sqlx::query_as::<_, File>(
            r#"INSERT INTO files (id, owner, folder_id, display_name, storage_name, mime_type, size_bytes, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
               RETURNING *"#,
        )
        .bind(FileId::new())
        .bind(&data.owner)
        .bind(data.folder_id)
        .bind(&data.display_name)
        .bind(&data.storage_name)
        .bind(&data.mime_type)
        .bind(data.size_bytes)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create file", e))
    }

    async fn update(&self, id: FileId, patch: &FilePatch) -> AppResult<Option<File>> {
        let mut qb = QueryBuilder::<Postgres>::new("");
        push_patch(&mut qb, patch);
        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<File>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to update file", e))
    }

    async fn update_many(&self, query: &FileQuery, patch: &FilePatch) -> AppResult<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("");
        push_patch(&mut qb, patch);
        qb.push(" WHERE TRUE");
        push_filter(&mut qb, query);

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to update files", e))?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: FileId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete file", e))?;
        Ok(result.rows_affected() > 0)
    }
}
