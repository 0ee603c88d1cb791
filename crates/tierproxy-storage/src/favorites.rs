use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tierproxy_common::time::now_rfc3339;

use crate::error::StorageError;
use crate::runtime_config::RuntimeConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub name: String,
    pub config: RuntimeConfig,
    pub created_at: String,
}

/// Named saved `RuntimeConfig` snapshots. Simple list CRUD, own writer lock,
/// persisted whole-file on every mutation.
pub struct FavoritesStore {
    path: PathBuf,
    state: Mutex<Vec<FavoriteEntry>>,
}

impl FavoritesStore {
    pub async fn load(path: PathBuf) -> Result<Self, StorageError> {
        let entries = tierproxy_common::fs::read_json::<Vec<FavoriteEntry>>(&path)
            .await?
            .unwrap_or_default();
        Ok(Self {
            path,
            state: Mutex::new(entries),
        })
    }

    pub fn list(&self) -> Vec<FavoriteEntry> {
        self.state.lock().expect("favorites lock poisoned").clone()
    }

    pub async fn add(&self, name: String, config: RuntimeConfig) -> Result<FavoriteEntry, StorageError> {
        let entry = FavoriteEntry {
            name,
            config,
            created_at: now_rfc3339(),
        };
        let snapshot = {
            let mut guard = self.state.lock().expect("favorites lock poisoned");
            guard.push(entry.clone());
            guard.clone()
        };
        self.persist(&snapshot).await?;
        Ok(entry)
    }

    /// Removes the entry at `index`. Returns `false` (no-op, nothing
    /// persisted) if the index is out of range.
    pub async fn remove(&self, index: usize) -> Result<bool, StorageError> {
        let (removed, snapshot) = {
            let mut guard = self.state.lock().expect("favorites lock poisoned");
            if index >= guard.len() {
                (false, None)
            } else {
                guard.remove(index);
                (true, Some(guard.clone()))
            }
        };
        if let Some(snapshot) = snapshot {
            self.persist(&snapshot).await?;
        }
        Ok(removed)
    }

    async fn persist(&self, entries: &[FavoriteEntry]) -> Result<(), StorageError> {
        tierproxy_common::fs::write_json_atomic(&self.path, &entries.to_vec()).await?;
        Ok(())
    }
}
