// # File State Store
//
// File-based implementation of StateStore with crash recovery.
//
// ## Crash Recovery
//
// - Atomic writes: write to `<path>.tmp`, then rename over the state file
// - Backup: the previous state file is copied to `<path>.backup` first
// - Recovery: a state file that fails to parse is replaced by the backup
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "resources": {
//     "cloudns_dns_record.www": {
//       "kind": "cloudns_dns_record",
//       "data": { "id": "1234", "attributes": { "name": "www", "ttl": 3600 } },
//       "last_synced": "2025-01-09T12:00:00Z"
//     }
//   }
// }
// ```

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::state_store::{StateStore, StoredResource};

/// State file format version
const STATE_FILE_VERSION: &str = "1.0";

/// File-based state store with crash recovery
///
/// Every `set` and `delete` is written through to disk.
///
/// # Example
///
/// ```rust,no_run
/// use zonesync_core::state::FileStateStore;
/// use zonesync_core::StateStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileStateStore::new("/var/lib/zonesync/state.json").await?;
///     for address in store.list().await? {
///         println!("{}", address);
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileStateStore {
    path: PathBuf,
    state: Arc<RwLock<FileState>>,
}

#[derive(Debug)]
struct FileState {
    resources: BTreeMap<String, StoredResource>,
    dirty: bool,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct StateFileFormat {
    version: String,
    resources: BTreeMap<String, StoredResource>,
}

impl FileStateStore {
    /// Create or load a file state store
    ///
    /// 1. Load the existing state file, if any
    /// 2. On a parse failure, fall back to the backup
    /// 3. If both fail, start empty
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    Error::config(format!(
                        "Failed to create state directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let resources = Self::load_state_with_recovery(&path).await?;

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(FileState {
                resources,
                dirty: false,
            })),
        })
    }

    async fn load_state_with_recovery(
        path: &Path,
    ) -> Result<BTreeMap<String, StoredResource>, Error> {
        let err = match Self::load_state(path).await {
            Ok(resources) => {
                tracing::debug!("Loaded state from file: {} resources", resources.len());
                return Ok(resources);
            }
            Err(e) => e,
        };

        if !matches!(err, Error::Json(_)) {
            return Err(err);
        }

        tracing::warn!(
            "State file appears corrupted: {}. Attempting recovery from backup.",
            err
        );

        let backup_path = Self::backup_path(path);
        if !backup_path.exists() {
            tracing::warn!("No backup file found. Starting with empty state.");
            return Ok(BTreeMap::new());
        }

        match Self::load_state(&backup_path).await {
            Ok(resources) => {
                tracing::info!("Recovered state from backup: {} resources", resources.len());
                if let Err(restore_err) = Self::restore_from_backup(path, &backup_path).await {
                    tracing::error!("Failed to restore state file from backup: {}", restore_err);
                }
                Ok(resources)
            }
            Err(backup_err) => {
                tracing::error!(
                    "Backup also corrupted: {}. Starting with empty state.",
                    backup_err
                );
                Ok(BTreeMap::new())
            }
        }
    }

    async fn load_state(path: &Path) -> Result<BTreeMap<String, StoredResource>, Error> {
        if !path.exists() {
            tracing::debug!("State file does not exist: {}", path.display());
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to read state file {}: {}",
                path.display(),
                e
            ))
        })?;

        let state_file: StateFileFormat = serde_json::from_str(&content)?;

        if state_file.version != STATE_FILE_VERSION {
            tracing::warn!(
                "State file version mismatch: expected {}, got {}. Attempting to load anyway.",
                STATE_FILE_VERSION,
                state_file.version
            );
        }

        Ok(state_file.resources)
    }

    async fn write_state(&self) -> Result<(), Error> {
        let mut state_guard = self.state.write().await;

        let state_file = StateFileFormat {
            version: STATE_FILE_VERSION.to_string(),
            resources: state_guard.resources.clone(),
        };
        let json = serde_json::to_string_pretty(&state_file)
            .map_err(|e| Error::state_store(format!("Failed to serialize state: {}", e)))?;

        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            file.flush().await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        if self.path.exists() {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path).await {
                tracing::warn!("Failed to create backup: {}", e);
            }
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        state_guard.dirty = false;
        tracing::trace!("State written to file: {}", self.path.display());
        Ok(())
    }

    async fn restore_from_backup(path: &Path, backup_path: &Path) -> Result<(), Error> {
        fs::copy(backup_path, path).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to restore from backup {} to {}: {}",
                backup_path.display(),
                path.display(),
                e
            ))
        })?;

        tracing::info!("Restored state file from backup");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn get(&self, address: &str) -> Result<Option<StoredResource>, Error> {
        let state_guard = self.state.read().await;
        Ok(state_guard.resources.get(address).cloned())
    }

    async fn set(&self, address: &str, resource: &StoredResource) -> Result<(), Error> {
        {
            let mut state_guard = self.state.write().await;
            state_guard
                .resources
                .insert(address.to_string(), resource.clone());
            state_guard.dirty = true;
        }
        self.write_state().await
    }

    async fn delete(&self, address: &str) -> Result<(), Error> {
        {
            let mut state_guard = self.state.write().await;
            if state_guard.resources.remove(address).is_none() {
                return Ok(());
            }
            state_guard.dirty = true;
        }
        self.write_state().await
    }

    async fn list(&self) -> Result<Vec<String>, Error> {
        let state_guard = self.state.read().await;
        Ok(state_guard.resources.keys().cloned().collect())
    }

    async fn flush(&self) -> Result<(), Error> {
        let dirty = self.state.read().await.dirty;
        if dirty {
            self.write_state().await
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResourceData;
    use tempfile::tempdir;

    fn record(id: &str) -> StoredResource {
        StoredResource::new(
            "cloudns_dns_record",
            ResourceData::new()
                .with("zone", "example.com")
                .with("type", "A")
                .with_id(id),
        )
    }

    #[tokio::test]
    async fn test_file_store_basic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = FileStateStore::new(&path).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());

        store.set("cloudns_dns_record.www", &record("1")).await.unwrap();
        assert!(path.exists());

        let store2 = FileStateStore::new(&path).await.unwrap();
        let loaded = store2.get("cloudns_dns_record.www").await.unwrap().unwrap();
        assert_eq!(loaded.data.id(), Some("1"));
        assert_eq!(loaded.data.get_str("type"), Some("A".to_string()));
    }

    #[tokio::test]
    async fn test_file_store_corruption_recovery() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = FileStateStore::new(&path).await.unwrap();
        store.set("cloudns_dns_record.www", &record("1")).await.unwrap();
        // second write leaves the first in the backup
        store.set("cloudns_dns_record.www", &record("2")).await.unwrap();

        let backup_path = FileStateStore::backup_path(&path);
        assert!(backup_path.exists());

        fs::write(&path, b"corrupted json data").await.unwrap();

        let store2 = FileStateStore::new(&path).await.unwrap();
        let recovered = store2.get("cloudns_dns_record.www").await.unwrap().unwrap();
        assert_eq!(recovered.data.id(), Some("1"));
    }

    #[tokio::test]
    async fn test_file_store_delete_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let store = FileStateStore::new(&path).await.unwrap();
        store.set("cloudns_dns_record.www", &record("1")).await.unwrap();
        store.delete("cloudns_dns_record.www").await.unwrap();
        store.flush().await.unwrap();

        let store2 = FileStateStore::new(&path).await.unwrap();
        assert!(store2.list().await.unwrap().is_empty());
    }
}
