//! Durable level-configuration stores.
//!
//! # Data Flow
//! ```text
//! Registry.update(id, level)
//!     → Store.set({id, level})          (durable write-through)
//!
//! Registry.attach_store(store)
//!     → Store.list()                    (snapshot into the local cache)
//!     → Store.subscribe_all()           (push-based reconciliation, optional)
//!
//! Out-of-band writer (other process, operator tooling)
//!     → Store mutates
//!     → subscription broadcast → Registry → live Logger instances
//! ```
//!
//! # Design Decisions
//! - Only `StoredConfig {id, level}` ever persists; sinks, hooks and
//!   formatters are runtime-only
//! - `subscribe_all` is optional; the registry must work with snapshot-only
//!   stores and may not assume push support
//! - Store failures are never fatal to logging, they only abandon the one
//!   reconciliation attempt

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::level::Level;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

/// Capacity of store change-notification channels.
///
/// Lagging subscribers lose the oldest notifications; the registry treats
/// the cache as authoritative so a lost echo only delays convergence.
pub(crate) const SUBSCRIPTION_CHANNEL_CAPACITY: usize = 64;

/// The serializable per-logger configuration record.
///
/// This is the only configuration shape that leaves the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredConfig {
    /// Logger id the record belongs to.
    pub id: String,
    /// Persisted minimum level, when one has been set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
}

impl StoredConfig {
    pub fn new(id: impl Into<String>, level: Option<Level>) -> Self {
        Self {
            id: id.into(),
            level,
        }
    }
}

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists for the requested id.
    #[error("no stored config for logger {id:?}")]
    NotFound {
        /// The id that was looked up.
        id: String,
    },

    /// Underlying I/O failed.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted content could not be (de)serialized.
    #[error("store serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The store backend is unreachable or shut down.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Asynchronous key-value holder of per-logger level configuration.
///
/// Implementations are external collaborators: an in-memory map, a JSON file,
/// a remote service. The registry is written against this contract only.
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch one logger's stored config. Fails with
    /// [`StoreError::NotFound`] when no record exists.
    async fn get(&self, id: &str) -> StoreResult<StoredConfig>;

    /// Insert or replace one logger's stored config. Idempotent.
    async fn set(&self, config: StoredConfig) -> StoreResult<()>;

    /// Replace the full set of stored configs.
    async fn set_all(&self, configs: Vec<StoredConfig>) -> StoreResult<()>;

    /// Snapshot of every stored config.
    async fn list(&self) -> StoreResult<Vec<StoredConfig>>;

    /// Subscribe to change notifications for all ids, when the backend
    /// supports push. The default is snapshot-only.
    fn subscribe_all(&self) -> Option<broadcast::Receiver<StoredConfig>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_config_json_shape() {
        let config = StoredConfig::new("x", Some(Level::Error));
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"id":"x","level":"error"}"#);

        let config = StoredConfig::new("y", None);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"id":"y"}"#);
    }

    #[test]
    fn test_stored_config_rejects_bad_level_token() {
        let result = serde_json::from_str::<StoredConfig>(r#"{"id":"x","level":"loud"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::NotFound { id: "gone".into() };
        assert!(err.to_string().contains("gone"));
    }
}
