use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::core::error::StoreError;
use crate::core::service::KeyValueStore;

/// [`KeyValueStore`] persisted as a single JSON object on disk.
///
/// Every mutation rewrites the file before returning. The lock is held for
/// the write so concurrent updates land in order.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(raw) if raw.trim().is_empty() => HashMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), keys = entries.len(), "Opened file store");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let raw = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, raw).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        if entries.remove(key).is_some() {
            self.persist(&entries).await?;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        entries.clear();
        self.persist(&entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("wallet-client-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_store() {
        let store = FileStore::open(temp_path("store.json")).await.unwrap();
        assert_eq!(store.get("auth_token").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let path = temp_path("store.json");
        {
            let store = FileStore::open(&path).await.unwrap();
            store.set("auth_token", "T1").await.unwrap();
            store.set("current_wallet_address", "0xabc").await.unwrap();
            store.remove("current_wallet_address").await.unwrap();
        }

        let reopened = FileStore::open(&path).await.unwrap();
        assert_eq!(reopened.get("auth_token").await.unwrap().as_deref(), Some("T1"));
        assert_eq!(reopened.get("current_wallet_address").await.unwrap(), None);

        if let Some(dir) = path.parent() {
            let _ = tokio::fs::remove_dir_all(dir).await;
        }
    }

    #[tokio::test]
    async fn test_corrupt_file_is_serialization_error() {
        let path = temp_path("store.json");
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(&path, "not json").await.unwrap();

        let result = FileStore::open(&path).await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
    }
}
