//! In-memory store implementation.

use crate::store::{
    Store, StoreError, StoreResult, StoredConfig, SUBSCRIPTION_CHANNEL_CAPACITY,
};
use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;

/// In-memory, process-local store with push notification.
///
/// Useful as the default store for single-process deployments and as the
/// reference implementation in tests. Every `set`/`set_all` broadcasts the
/// affected records to subscribers.
#[derive(Debug)]
pub struct MemoryStore {
    configs: DashMap<String, StoredConfig>,
    changes: broadcast::Sender<StoredConfig>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        let (changes, _) = broadcast::channel(SUBSCRIPTION_CHANNEL_CAPACITY);
        Self {
            configs: DashMap::new(),
            changes,
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn notify(&self, config: &StoredConfig) {
        // No subscribers is fine; send only fails then.
        let _ = self.changes.send(config.clone());
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, id: &str) -> StoreResult<StoredConfig> {
        self.configs
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    async fn set(&self, config: StoredConfig) -> StoreResult<()> {
        self.configs.insert(config.id.clone(), config.clone());
        self.notify(&config);
        Ok(())
    }

    async fn set_all(&self, configs: Vec<StoredConfig>) -> StoreResult<()> {
        self.configs.clear();
        for config in configs {
            self.configs.insert(config.id.clone(), config.clone());
            self.notify(&config);
        }
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<StoredConfig>> {
        Ok(self
            .configs
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    fn subscribe_all(&self) -> Option<broadcast::Receiver<StoredConfig>> {
        Some(self.changes.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;

    #[tokio::test]
    async fn test_round_trip() {
        let store = MemoryStore::new();
        store
            .set(StoredConfig::new("y", Some(Level::Trace)))
            .await
            .unwrap();
        let config = store.get("y").await.unwrap();
        assert_eq!(config, StoredConfig::new("y", Some(Level::Trace)));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = MemoryStore::new();
        match store.get("missing").await {
            Err(StoreError::NotFound { id }) => assert_eq!(id, "missing"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_set_is_idempotent_upsert() {
        let store = MemoryStore::new();
        store
            .set(StoredConfig::new("a", Some(Level::Info)))
            .await
            .unwrap();
        store
            .set(StoredConfig::new("a", Some(Level::Error)))
            .await
            .unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
        assert_eq!(store.get("a").await.unwrap().level, Some(Level::Error));
    }

    #[tokio::test]
    async fn test_set_all_replaces_snapshot() {
        let store = MemoryStore::new();
        store
            .set(StoredConfig::new("old", Some(Level::Warn)))
            .await
            .unwrap();
        store
            .set_all(vec![
                StoredConfig::new("a", Some(Level::Debug)),
                StoredConfig::new("b", None),
            ])
            .await
            .unwrap();
        let mut ids: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        ids.sort();
        assert_eq!(ids, ["a", "b"]);
    }

    #[tokio::test]
    async fn test_subscribe_all_sees_writes() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe_all().unwrap();
        store
            .set(StoredConfig::new("watched", Some(Level::Debug)))
            .await
            .unwrap();
        let change = rx.recv().await.unwrap();
        assert_eq!(change.id, "watched");
        assert_eq!(change.level, Some(Level::Debug));
    }
}
