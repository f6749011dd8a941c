//! File-backed store implementation.
//!
//! # Responsibilities
//! - Persist logger configs as a JSON array of records on disk
//! - Survive missing or corrupt files by resetting to an empty array
//! - Push changes made by out-of-process writers via a file watcher
//!
//! # Design Decisions
//! - Every operation reloads the file, so concurrent external writers are
//!   observed rather than clobbered by a stale in-memory copy
//! - Self-writes update the last-seen snapshot before the watcher fires, so
//!   subscribers only see genuine changes once

use crate::store::{
    Store, StoreError, StoreResult, StoredConfig, SUBSCRIPTION_CHANNEL_CAPACITY,
};
use async_trait::async_trait;
use notify::{Config as NotifyConfig, Event as NotifyEvent, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

/// Store that persists configs in a JSON file.
///
/// The file holds a JSON array of `{id, level}` records. A missing file is
/// created empty; corrupt content is reset to an empty array with a
/// diagnostic instead of failing startup.
pub struct FileStore {
    path: PathBuf,
    changes: broadcast::Sender<StoredConfig>,
    watcher: Mutex<Option<RecommendedWatcher>>,
    last_seen: Arc<Mutex<HashMap<String, StoredConfig>>>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let (changes, _) = broadcast::channel(SUBSCRIPTION_CHANNEL_CAPACITY);
        Self {
            path: path.into(),
            changes,
            watcher: Mutex::new(None),
            last_seen: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the backing file, creating or resetting it as needed.
    fn read_file(path: &Path) -> StoreResult<HashMap<String, StoredConfig>> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, "[]")?;
            return Ok(HashMap::new());
        }

        let data = std::fs::read_to_string(path)?;
        match serde_json::from_str::<Vec<StoredConfig>>(&data) {
            Ok(configs) => Ok(configs.into_iter().map(|c| (c.id.clone(), c)).collect()),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "corrupt store file, resetting to empty");
                std::fs::write(path, "[]")?;
                Ok(HashMap::new())
            }
        }
    }

    fn load(&self) -> StoreResult<HashMap<String, StoredConfig>> {
        let configs = Self::read_file(&self.path)?;
        if let Ok(mut last) = self.last_seen.lock() {
            *last = configs.clone();
        }
        Ok(configs)
    }

    fn save(&self, configs: &HashMap<String, StoredConfig>) -> StoreResult<()> {
        let records: Vec<&StoredConfig> = configs.values().collect();
        let data = serde_json::to_string_pretty(&records)?;
        std::fs::write(&self.path, data)?;
        if let Ok(mut last) = self.last_seen.lock() {
            *last = configs.clone();
        }
        Ok(())
    }

    /// Start the file watcher that feeds the change channel.
    ///
    /// Reloads on every modify/create event and broadcasts only records that
    /// differ from the last-seen snapshot.
    fn start_watcher(&self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.path.clone();
        let tx = self.changes.clone();
        let last_seen = Arc::clone(&self.last_seen);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<NotifyEvent>| match res {
                Ok(event) => {
                    if !event.kind.is_modify() && !event.kind.is_create() {
                        return;
                    }
                    let configs = match Self::read_file(&path) {
                        Ok(configs) => configs,
                        Err(err) => {
                            tracing::error!(path = %path.display(), %err, "failed to reload store file");
                            return;
                        }
                    };
                    let Ok(mut last) = last_seen.lock() else {
                        return;
                    };
                    for (id, config) in &configs {
                        if last.get(id) != Some(config) {
                            let _ = tx.send(config.clone());
                        }
                    }
                    *last = configs;
                }
                Err(err) => tracing::error!(?err, "store file watch error"),
            },
            NotifyConfig::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;
        tracing::debug!(path = %self.path.display(), "store file watcher started");
        Ok(watcher)
    }
}

#[async_trait]
impl Store for FileStore {
    async fn get(&self, id: &str) -> StoreResult<StoredConfig> {
        let configs = self.load()?;
        configs
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    async fn set(&self, config: StoredConfig) -> StoreResult<()> {
        let mut configs = self.load()?;
        configs.insert(config.id.clone(), config.clone());
        self.save(&configs)?;
        let _ = self.changes.send(config);
        Ok(())
    }

    async fn set_all(&self, new_configs: Vec<StoredConfig>) -> StoreResult<()> {
        // Load first so a corrupt file is reset before being replaced.
        self.load()?;
        let configs: HashMap<String, StoredConfig> = new_configs
            .iter()
            .map(|c| (c.id.clone(), c.clone()))
            .collect();
        self.save(&configs)?;
        for config in new_configs {
            let _ = self.changes.send(config);
        }
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<StoredConfig>> {
        Ok(self.load()?.into_values().collect())
    }

    fn subscribe_all(&self) -> Option<broadcast::Receiver<StoredConfig>> {
        let Ok(mut guard) = self.watcher.lock() else {
            return None;
        };
        if guard.is_none() {
            // The watcher needs an existing file to attach to.
            if let Err(err) = Self::read_file(&self.path) {
                tracing::error!(path = %self.path.display(), %err, "cannot prepare store file for watching");
                return None;
            }
            match self.start_watcher() {
                Ok(watcher) => *guard = Some(watcher),
                Err(err) => {
                    tracing::error!(path = %self.path.display(), %err, "store file watcher failed to start");
                    return None;
                }
            }
        }
        Some(self.changes.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("logkit-{}-{}.json", name, std::process::id()))
    }

    #[tokio::test]
    async fn test_round_trip() {
        let path = temp_path("round-trip");
        let store = FileStore::new(&path);

        store
            .set(StoredConfig::new("y", Some(Level::Trace)))
            .await
            .unwrap();
        let config = store.get("y").await.unwrap();
        assert_eq!(config, StoredConfig::new("y", Some(Level::Trace)));

        // A second store over the same file sees the persisted record.
        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get("y").await.unwrap().level,
            Some(Level::Trace)
        );

        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[tokio::test]
    async fn test_missing_file_created_empty() {
        let path = temp_path("created-empty");
        std::fs::remove_file(&path).unwrap_or_default();

        let store = FileStore::new(&path);
        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");

        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[tokio::test]
    async fn test_corrupt_file_resets_to_empty() {
        let path = temp_path("corrupt");
        std::fs::write(&path, "{ not json ]").unwrap();

        let store = FileStore::new(&path);
        assert!(store.list().await.unwrap().is_empty());
        match store.get("anything").await {
            Err(StoreError::NotFound { .. }) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }

        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[tokio::test]
    async fn test_set_all_replaces_file_contents() {
        let path = temp_path("set-all");
        let store = FileStore::new(&path);

        store
            .set(StoredConfig::new("old", Some(Level::Warn)))
            .await
            .unwrap();
        store
            .set_all(vec![StoredConfig::new("new", Some(Level::Debug))])
            .await
            .unwrap();

        let configs = store.list().await.unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].id, "new");

        std::fs::remove_file(&path).unwrap_or_default();
    }

    #[tokio::test]
    async fn test_self_writes_reach_subscribers() {
        let path = temp_path("subscribe");
        let store = FileStore::new(&path);

        let mut rx = store.subscribe_all().expect("watcher should start");
        store
            .set(StoredConfig::new("svc", Some(Level::Error)))
            .await
            .unwrap();

        let change = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("change not delivered")
            .unwrap();
        assert_eq!(change.id, "svc");
        assert_eq!(change.level, Some(Level::Error));

        std::fs::remove_file(&path).unwrap_or_default();
    }
}
