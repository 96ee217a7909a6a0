//! Table-backed storage on PostgreSQL.
//!
//! Tables are created by the migrations in `migrations/`:
//! - `api_keys`: one row per [`AccessKey`]
//! - `search_logs`: one row per [`SearchLog`], `seq` breaks timestamp ties

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Storage;
use crate::db::DbPool;
use crate::error::StorageError;
use crate::models::{
    access_key::AccessKey,
    search_log::{LogStatus, SearchLog},
};

/// Row shape of `search_logs`; `status` is stored as text.
#[derive(Debug, sqlx::FromRow)]
struct SearchLogRow {
    id: Uuid,
    key_name: String,
    endpoint: String,
    query: String,
    created_at: DateTime<Utc>,
    status: String,
}

impl TryFrom<SearchLogRow> for SearchLog {
    type Error = StorageError;

    fn try_from(row: SearchLogRow) -> Result<Self, Self::Error> {
        let status = LogStatus::parse(&row.status).ok_or_else(|| {
            StorageError::Database(sqlx::Error::Decode(
                format!("unknown log status {:?}", row.status).into(),
            ))
        })?;

        Ok(SearchLog {
            id: row.id,
            key_name: row.key_name,
            endpoint: row.endpoint,
            query: row.query,
            timestamp: row.created_at,
            status,
        })
    }
}

/// [`Storage`] over a PostgreSQL pool.
pub struct PgStorage {
    pool: DbPool,
}

impl PgStorage {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn list_keys(&self) -> Result<Vec<AccessKey>, StorageError> {
        let keys = sqlx::query_as::<_, AccessKey>(
            "SELECT id, name, key, created_at, uses, enabled
             FROM api_keys
             ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(keys)
    }

    async fn find_key(&self, id: Uuid) -> Result<Option<AccessKey>, StorageError> {
        let key = sqlx::query_as::<_, AccessKey>(
            "SELECT id, name, key, created_at, uses, enabled FROM api_keys WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(key)
    }

    async fn insert_key(&self, key: &AccessKey) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO api_keys (id, name, key, created_at, uses, enabled)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(key.id)
        .bind(&key.name)
        .bind(&key.key)
        .bind(key.created_at)
        .bind(key.uses)
        .bind(key.enabled)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_key(&self, id: Uuid) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM api_keys WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn set_key_enabled(&self, id: Uuid, enabled: bool) -> Result<(), StorageError> {
        sqlx::query("UPDATE api_keys SET enabled = $1 WHERE id = $2")
            .bind(enabled)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn consume_key(&self, key: &str) -> Result<Option<AccessKey>, StorageError> {
        // Single statement, so the increment itself cannot be lost
        let found = sqlx::query_as::<_, AccessKey>(
            r#"
            UPDATE api_keys
            SET uses = uses + 1
            WHERE id = (
                SELECT id FROM api_keys
                WHERE key = $1 AND enabled = true
                ORDER BY created_at ASC
                LIMIT 1
            )
            RETURNING id, name, key, created_at, uses, enabled
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found)
    }

    async fn prepend_log(&self, log: &SearchLog, cap: usize) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO search_logs (id, key_name, endpoint, query, created_at, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(log.id)
        .bind(&log.key_name)
        .bind(&log.endpoint)
        .bind(&log.query)
        .bind(log.timestamp)
        .bind(log.status.as_str())
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM search_logs
            WHERE id NOT IN (
                SELECT id FROM search_logs
                ORDER BY created_at DESC, seq DESC
                LIMIT $1
            )
            "#,
        )
        .bind(cap as i64)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_logs(&self, limit: usize) -> Result<Vec<SearchLog>, StorageError> {
        let rows = sqlx::query_as::<_, SearchLogRow>(
            "SELECT id, key_name, endpoint, query, created_at, status
             FROM search_logs
             ORDER BY created_at DESC, seq DESC
             LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SearchLog::try_from).collect()
    }

    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
