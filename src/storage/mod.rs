//! Persistence backends.
//!
//! Key and log services depend only on the [`Storage`] trait. Two implementations
//! exist and one is chosen at startup:
//!
//! - [`local::LocalStorage`]: two JSON blobs (`keys`, `logs`) in memory or on disk
//! - [`postgres::PgStorage`]: the `api_keys` and `search_logs` tables

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StorageError;
use crate::models::{access_key::AccessKey, search_log::SearchLog};

pub mod local;
pub mod postgres;

/// Shared handle to whichever backend was configured.
pub type DynStorage = Arc<dyn Storage>;

/// Persistence operations for access keys and search logs.
///
/// Each call is atomic per record at most; no operation spans a transaction
/// across several calls.
#[async_trait]
pub trait Storage: Send + Sync {
    /// All keys. Order is backend specific: insertion order for blobs,
    /// newest first for tables.
    async fn list_keys(&self) -> Result<Vec<AccessKey>, StorageError>;

    /// A single key by id.
    async fn find_key(&self, id: Uuid) -> Result<Option<AccessKey>, StorageError>;

    /// Persist a new key record.
    async fn insert_key(&self, key: &AccessKey) -> Result<(), StorageError>;

    /// Remove a key. Absent ids are not an error.
    async fn delete_key(&self, id: Uuid) -> Result<(), StorageError>;

    /// Overwrite the enabled flag. Absent ids are not an error.
    async fn set_key_enabled(&self, id: Uuid, enabled: bool) -> Result<(), StorageError>;

    /// Find the first enabled key whose value equals `key`, increment its `uses`
    /// and return the updated record.
    async fn consume_key(&self, key: &str) -> Result<Option<AccessKey>, StorageError>;

    /// Insert `log` as the newest entry and drop everything beyond the newest `cap`.
    async fn prepend_log(&self, log: &SearchLog, cap: usize) -> Result<(), StorageError>;

    /// Up to `limit` entries, newest first.
    async fn list_logs(&self, limit: usize) -> Result<Vec<SearchLog>, StorageError>;

    /// Cheap reachability check for health probes.
    async fn ping(&self) -> Result<(), StorageError>;
}
