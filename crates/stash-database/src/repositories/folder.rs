//! Folder repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};

use stash_core::error::AppError;
use stash_core::result::AppResult;
use stash_core::types::{FolderId, ParentRef, raw_uuids};
use stash_entity::LifecycleFilter;
use stash_entity::folder::{CreateFolder, Folder, FolderPatch, FolderQuery};

use crate::error::{db_error, is_unique_violation};
use crate::store::FolderStore;

/// Name of the partial unique index over active sibling names.
const ACTIVE_NAME_KEY: &str = "folders_active_name_key";

/// Repository for the `folders` table.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_write_error(name: Option<&str>, context: &str, e: sqlx::Error) -> AppError {
        if is_unique_violation(&e, ACTIVE_NAME_KEY) {
            return AppError::duplicate_name(format!(
                "Folder '{}' already exists in this location",
                name.unwrap_or_default()
            ));
        }
        db_error(context, e)
    }
}

/// Append `AND ...` clauses for every set field of the query.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, query: &FolderQuery) {
    if let Some(owner) = &query.owner {
        qb.push(" AND owner = ").push_bind(owner.clone());
    }
    match query.parent {
        Some(ParentRef::Root) => {
            qb.push(" AND parent_id IS NULL");
        }
        Some(ParentRef::Folder(parent)) => {
            qb.push(" AND parent_id = ").push_bind(parent);
        }
        None => {}
    }
    if let Some(name) = &query.name {
        qb.push(" AND name = ").push_bind(name.clone());
    }
    if let Some(ids) = &query.ids {
        qb.push(" AND id = ANY(").push_bind(raw_uuids(ids)).push(")");
    }
    if let Some(exclude) = query.exclude {
        qb.push(" AND id <> ").push_bind(exclude);
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

/// Append `, column = value` assignments for every set field of the patch.
fn push_patch(qb: &mut QueryBuilder<'_, Postgres>, patch: &FolderPatch) {
    qb.push("UPDATE folders SET updated_at = ").push_bind(Utc::now());
    if let Some(name) = &patch.name {
        qb.push(", name = ").push_bind(name.clone());
    }
    if let Some(description) = &patch.description {
        qb.push(", description = ").push_bind(description.clone());
    }
    if let Some(deleted_at) = patch.deleted_at {
        qb.push(", deleted_at = ").push_bind(deleted_at);
    }
}

#[async_trait]
impl FolderStore for FolderRepository {
    async fn get(&self, id: FolderId) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find folder", e))
    }

    async fn find(&self, query: &FolderQuery) -> AppResult<Vec<Folder>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM folders WHERE TRUE");
        push_filter(&mut qb, query);
        qb.push(" ORDER BY name ASC, created_at ASC");

        qb.build_query_as::<Folder>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list folders", e))
    }

    async fn insert(&self, data: &CreateFolder) -> AppResult<Folder> {
        let now = Utc::now();
        sqlx::query_as::<_, Folder>(
            r#"INSERT INTO folders (id, owner, name, parent_id, physical_path, description, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
               RETURNING *"#,
        )
        .bind(FolderId::new())
        .bind(&data.owner)
        .bind(&data.name)
        .bind(data.parent_id)
        .bind(&data.physical_path)
        .bind(&data.description)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(Some(&data.name), "Failed to create folder", e))
    }

    async fn update(&self, id: FolderId, patch: &FolderPatch) -> AppResult<Option<Folder>> {
        let mut qb = QueryBuilder::<Postgres>::new("");
        push_patch(&mut qb, patch);
        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<Folder>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::map_write_error(patch.name.as_deref(), "Failed to update folder", e))
    }

    async fn update_many(&self, query: &FolderQuery, patch: &FolderPatch) -> AppResult<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("");
        push_patch(&mut qb, patch);
        qb.push(" WHERE TRUE");
        push_filter(&mut qb, query);

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| Self::map_write_error(patch.name.as_deref(), "Failed to update folders", e))?;
        Ok(result.rows_affected())
    }

    async fn delete_many(&self, ids: &[FolderId]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM folders WHERE id = ANY($1)")
            .bind(raw_uuids(ids))
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete folders", e))?;
        Ok(result.rows_affected())
    }
}
