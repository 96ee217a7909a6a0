//! Blob-backed storage.
//!
//! The whole key collection lives in one JSON array under the blob name `keys`,
//! the log collection under `logs`. Every mutation reads the blob, edits the
//! decoded vector and writes the blob back. A single async mutex serialises those
//! read-modify-write cycles within this process.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::Storage;
use crate::error::StorageError;
use crate::models::{access_key::AccessKey, search_log::SearchLog};

const KEYS_BLOB: &str = "keys";
const LOGS_BLOB: &str = "logs";

/// Where blobs are kept.
enum Blobs {
    Memory(HashMap<&'static str, String>),
    Directory(PathBuf),
}

impl Blobs {
    async fn get(&self, name: &'static str) -> Result<Option<String>, StorageError> {
        match self {
            Blobs::Memory(map) => Ok(map.get(name).cloned()),
            Blobs::Directory(dir) => {
                match tokio::fs::read_to_string(dir.join(format!("{name}.json"))).await {
                    Ok(raw) => Ok(Some(raw)),
                    Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                    Err(e) => Err(e.into()),
                }
            }
        }
    }

    async fn put(&mut self, name: &'static str, raw: String) -> Result<(), StorageError> {
        match self {
            Blobs::Memory(map) => {
                map.insert(name, raw);
                Ok(())
            }
            Blobs::Directory(dir) => {
                // Write-then-rename so a crash never leaves a half-written blob
                let target = dir.join(format!("{name}.json"));
                let staging = dir.join(format!("{name}.json.tmp"));
                tokio::fs::write(&staging, raw).await?;
                tokio::fs::rename(&staging, &target).await?;
                Ok(())
            }
        }
    }

    async fn read<T: DeserializeOwned>(&self, name: &'static str) -> Result<Vec<T>, StorageError> {
        match self.get(name).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    async fn write<T: Serialize>(
        &mut self,
        name: &'static str,
        items: &[T],
    ) -> Result<(), StorageError> {
        let raw = serde_json::to_string(items)?;
        self.put(name, raw).await
    }
}

/// [`Storage`] over two named JSON blobs.
pub struct LocalStorage {
    blobs: Mutex<Blobs>,
}

impl LocalStorage {
    /// Blobs held in process memory; everything is lost on drop.
    pub fn in_memory() -> Self {
        Self {
            blobs: Mutex::new(Blobs::Memory(HashMap::new())),
        }
    }

    /// Blobs stored as `<dir>/keys.json` and `<dir>/logs.json`.
    ///
    /// Creates `dir` if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            blobs: Mutex::new(Blobs::Directory(dir)),
        })
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn list_keys(&self) -> Result<Vec<AccessKey>, StorageError> {
        self.blobs.lock().await.read(KEYS_BLOB).await
    }

    async fn find_key(&self, id: Uuid) -> Result<Option<AccessKey>, StorageError> {
        let keys: Vec<AccessKey> = self.blobs.lock().await.read(KEYS_BLOB).await?;
        Ok(keys.into_iter().find(|k| k.id == id))
    }

    async fn insert_key(&self, key: &AccessKey) -> Result<(), StorageError> {
        let mut blobs = self.blobs.lock().await;
        let mut keys: Vec<AccessKey> = blobs.read(KEYS_BLOB).await?;
        keys.push(key.clone());
        blobs.write(KEYS_BLOB, &keys).await
    }

    async fn delete_key(&self, id: Uuid) -> Result<(), StorageError> {
        let mut blobs = self.blobs.lock().await;
        let mut keys: Vec<AccessKey> = blobs.read(KEYS_BLOB).await?;
        let before = keys.len();
        keys.retain(|k| k.id != id);
        if keys.len() == before {
            return Ok(());
        }
        blobs.write(KEYS_BLOB, &keys).await
    }

    async fn set_key_enabled(&self, id: Uuid, enabled: bool) -> Result<(), StorageError> {
        let mut blobs = self.blobs.lock().await;
        let mut keys: Vec<AccessKey> = blobs.read(KEYS_BLOB).await?;
        match keys.iter_mut().find(|k| k.id == id) {
            Some(key) => key.enabled = enabled,
            None => return Ok(()),
        }
        blobs.write(KEYS_BLOB, &keys).await
    }

    async fn consume_key(&self, key: &str) -> Result<Option<AccessKey>, StorageError> {
        let mut blobs = self.blobs.lock().await;
        let mut keys: Vec<AccessKey> = blobs.read(KEYS_BLOB).await?;
        let Some(found) = keys.iter_mut().find(|k| k.key == key && k.enabled) else {
            return Ok(None);
        };
        found.uses += 1;
        let found = found.clone();
        blobs.write(KEYS_BLOB, &keys).await?;
        Ok(Some(found))
    }

    async fn prepend_log(&self, log: &SearchLog, cap: usize) -> Result<(), StorageError> {
        let mut blobs = self.blobs.lock().await;
        let mut logs: Vec<SearchLog> = blobs.read(LOGS_BLOB).await?;
        logs.insert(0, log.clone());
        logs.truncate(cap);
        blobs.write(LOGS_BLOB, &logs).await
    }

    async fn list_logs(&self, limit: usize) -> Result<Vec<SearchLog>, StorageError> {
        let mut logs: Vec<SearchLog> = self.blobs.lock().await.read(LOGS_BLOB).await?;
        logs.truncate(limit);
        Ok(logs)
    }

    async fn ping(&self) -> Result<(), StorageError> {
        self.blobs.lock().await.get(KEYS_BLOB).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::search_log::{LogStatus, NewSearchLog};

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("lookup-gateway-test-{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_directory_blobs_survive_reopen() {
        let dir = temp_dir();

        let storage = LocalStorage::open(&dir).await.unwrap();
        let key = AccessKey::new("Tester", "ak_persisted");
        storage.insert_key(&key).await.unwrap();
        drop(storage);

        let reopened = LocalStorage::open(&dir).await.unwrap();
        let keys = reopened.list_keys().await.unwrap();
        assert_eq!(keys, vec![key]);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_blob_is_an_error() {
        let dir = temp_dir();
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("keys.json"), "not json").await.unwrap();

        let storage = LocalStorage::open(&dir).await.unwrap();
        assert!(matches!(
            storage.list_keys().await,
            Err(StorageError::Serialization(_))
        ));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_keys_keep_insertion_order() {
        let storage = LocalStorage::in_memory();
        let first = AccessKey::new("First", "a");
        let second = AccessKey::new("Second", "b");
        storage.insert_key(&first).await.unwrap();
        storage.insert_key(&second).await.unwrap();

        let names: Vec<_> = storage
            .list_keys()
            .await
            .unwrap()
            .into_iter()
            .map(|k| k.name)
            .collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[tokio::test]
    async fn test_consume_picks_first_enabled_match() {
        let storage = LocalStorage::in_memory();
        let disabled = AccessKey {
            enabled: false,
            ..AccessKey::new("Disabled", "shared")
        };
        let enabled = AccessKey::new("Enabled", "shared");
        storage.insert_key(&disabled).await.unwrap();
        storage.insert_key(&enabled).await.unwrap();

        let found = storage.consume_key("shared").await.unwrap().unwrap();
        assert_eq!(found.id, enabled.id);
        assert_eq!(found.uses, 1);

        let stored = storage.find_key(disabled.id).await.unwrap().unwrap();
        assert_eq!(stored.uses, 0);
    }

    #[tokio::test]
    async fn test_prepend_log_truncates_to_cap() {
        let storage = LocalStorage::in_memory();
        for i in 0..5 {
            let log = NewSearchLog {
                key_name: "Tester".to_string(),
                endpoint: "/mobile".to_string(),
                query: i.to_string(),
                status: LogStatus::Success,
            }
            .into_log();
            storage.prepend_log(&log, 3).await.unwrap();
        }

        let queries: Vec<_> = storage
            .list_logs(10)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.query)
            .collect();
        assert_eq!(queries, vec!["4", "3", "2"]);
    }
}
