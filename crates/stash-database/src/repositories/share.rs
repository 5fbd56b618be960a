//! Share repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use stash_core::error::AppError;
use stash_core::result::AppResult;
use stash_core::types::{ShareId, raw_uuids};
use stash_entity::share::{CreateShare, Share, ShareQuery};

use crate::error::{db_error, is_unique_violation};
use crate::store::ShareStore;

const TOKEN_KEY: &str = "shares_token_key";

/// Repository for the `shares` table.
#[derive(Debug, Clone)]
pub struct ShareRepository {
    pool: PgPool,
}

impl ShareRepository {
    /// Create a new share repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, query: &ShareQuery) {
    if let Some(ids) = &query.file_ids {
        qb.push(" AND file_id = ANY(").push_bind(raw_uuids(ids)).push(")");
    }
    if query.only_unrevoked {
        qb.push(" AND is_revoked = FALSE");
    }
}

#[async_trait]
impl ShareStore for ShareRepository {
    async fn get(&self, id: ShareId) -> AppResult<Option<Share>> {
        sqlx::query_as::<_, Share>("SELECT * FROM shares WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find share", e))
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<Share>> {
        sqlx::query_as::<_, Share>("SELECT * FROM shares WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find share by token", e))
    }

    async fn find(&self, query: &ShareQuery) -> AppResult<Vec<Share>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM shares WHERE TRUE");
        push_filter(&mut qb, query);
        qb.push(" ORDER BY created_at DESC");

        qb.build_query_as::<Share>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list shares", e))
    }

    async fn insert(&self, data: &CreateShare) -> AppResult<Share> {
        sqlx::query_as::<_, Share>(
            r#"INSERT INTO shares (id, file_id, token, expires_at, created_at)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(ShareId::new())
        .bind(data.file_id)
        .bind(&data.token)
        .bind(data.expires_at)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, TOKEN_KEY) {
                AppError::conflict("Share token already in use")
            } else {
                db_error("Failed to create share", e)
            }
        })
    }

    async fn revoke_many(&self, query: &ShareQuery) -> AppResult<u64> {
        let mut qb =
            QueryBuilder::<Postgres>::new("UPDATE shares SET is_revoked = TRUE WHERE is_revoked = FALSE");
        push_filter(&mut qb, query);

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to revoke shares", e))?;
        Ok(result.rows_affected())
    }

    async fn record_access(&self, id: ShareId, at: DateTime<Utc>) -> AppResult<Option<Share>> {
        sqlx::query_as::<_, Share>(
            r#"UPDATE shares
               SET download_count = download_count + 1, last_accessed_at = $2
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to record share access", e))
    }

    async fn delete_many(&self, query: &ShareQuery) -> AppResult<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM shares WHERE TRUE");
        push_filter(&mut qb, query);

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete shares", e))?;
        Ok(result.rows_affected())
    }
}
