//! Key-value blob stores for the local library.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

use assethub_core::error::{AppError, ErrorKind};
use assethub_core::result::AppResult;

use crate::traits::BlobStore;

/// Blob store keeping one `<key>.json` file per key under a root directory.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    /// Create a store rooted at the given directory, creating it if needed.
    pub async fn new(root: impl AsRef<Path>) -> AppResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create blob directory: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(AppError::validation(format!("Invalid storage key: {key:?}")));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let path = self.resolve(key)?;
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read {}", path.display()),
                e,
            )),
        }
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let path = self.resolve(key)?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write {}", staging.display()),
                e,
            )
        })?;
        fs::rename(&staging, &path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to replace {}", path.display()),
                e,
            )
        })?;
        debug!(key, bytes = value.len(), "Wrote blob");
        Ok(())
    }
}

/// In-memory blob store with an optional per-value size ceiling.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    values: RwLock<HashMap<String, String>>,
    capacity_bytes: Option<u64>,
}

impl MemoryBlobStore {
    /// Create an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that refuses values larger than `capacity_bytes`.
    pub fn with_capacity(capacity_bytes: u64) -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            capacity_bytes: Some(capacity_bytes),
        }
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        if let Some(capacity) = self.capacity_bytes {
            if value.len() as u64 > capacity {
                return Err(AppError::quota("Storage quota exceeded"));
            }
        }
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBlobStore::new(dir.path()).await.unwrap();

        assert_eq!(store.get("assetLibrary").await.unwrap(), None);
        store.set("assetLibrary", "[]").await.unwrap();
        store.set("assetLibrary", "[1]").await.unwrap();
        assert_eq!(
            store.get("assetLibrary").await.unwrap().as_deref(),
            Some("[1]")
        );
        assert!(dir.path().join("assetLibrary.json").exists());
        assert!(!dir.path().join("assetLibrary.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_store_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBlobStore::new(dir.path()).await.unwrap();
        assert!(store.set("../escape", "x").await.is_err());
        assert!(store.get("").await.is_err());
    }

    #[tokio::test]
    async fn test_memory_store_capacity() {
        let store = MemoryBlobStore::with_capacity(4);
        store.set("k", "1234").await.unwrap();
        let err = store.set("k", "12345").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Quota);
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("1234"));
    }
}
