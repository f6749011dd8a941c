//! The registry: live loggers reconciled with stored configuration.
//!
//! # Data Flow
//! ```text
//! register(logger)
//!     → live map insert (replace allowed, diagnosed)
//!     → cached level applied synchronously, when known
//!     → else: background hydration fetch from the store
//!       (NotFound → back-fill the logger's default level into the store)
//!
//! attach_store(store)
//!     → cancel prior subscription
//!     → list() snapshot into the local cache
//!     → apply cached levels to already-registered loggers
//!     → subscribe to pushed changes, when the store supports it
//!
//! update(id, level)
//!     → cache + live logger updated synchronously
//!     → written through to the store (durable)
//! ```
//!
//! # Design Decisions
//! - The local cache is authoritative for synchronous reads once a store has
//!   been bootstrapped; register-time hydration is the best-effort fallback
//!   for loggers created before that, an explicit eventual-consistency
//!   contract
//! - Every authoritative write bumps a per-id sequence; hydration results
//!   apply only if the sequence did not move while the fetch was in flight,
//!   so levels converge instead of diverging
//! - Store failures abandon the one reconciliation attempt and never block
//!   logger construction or event dispatch

mod cache;

use crate::error::{Error, Result};
use crate::level::Level;
use crate::logger::Logger;
use crate::store::{Store, StoreError, StoredConfig};
use arc_swap::ArcSwap;
use cache::LevelCache;
use dashmap::DashMap;
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Process-wide coordinator of live loggers and their stored levels.
///
/// Holds the one connection to a [`Store`] and the single change
/// subscription to it; the live map and cache are mutated only through the
/// registry's own operations.
pub struct Registry {
    loggers: DashMap<String, Arc<Logger>>,
    cache: LevelCache,
    store: ArcSwap<Option<Arc<dyn Store>>>,
    subscription: Mutex<Option<JoinHandle<()>>>,
}

impl Registry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            loggers: DashMap::new(),
            cache: LevelCache::new(),
            store: ArcSwap::from_pointee(None),
            subscription: Mutex::new(None),
        })
    }

    /// The attached store, if any.
    pub fn store(&self) -> Option<Arc<dyn Store>> {
        self.store.load().as_ref().clone()
    }

    /// True when a logger is registered under `id`.
    pub fn has(&self, id: &str) -> bool {
        self.loggers.contains_key(id)
    }

    /// The live logger registered under `id`.
    pub fn get(&self, id: &str) -> Result<Arc<Logger>> {
        self.loggers
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| {
                tracing::debug!(logger_id = %id, "logger not found in registry");
                Error::LoggerNotFound { id: id.to_string() }
            })
    }

    /// Every live logger, in no particular order.
    pub fn get_all(&self) -> Vec<Arc<Logger>> {
        self.loggers
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Number of live loggers.
    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }

    /// Insert or replace the logger under its id.
    ///
    /// Replacing an existing id is allowed and diagnosed, never an error.
    /// If the local cache knows a level for this id it is applied
    /// synchronously; otherwise, with a store attached, a background fetch
    /// hydrates the logger when it resolves. An id absent from the store is
    /// back-filled with the logger's current default level: the store is the
    /// durable source of truth and is seeded from runtime defaults for
    /// first-seen loggers, never the other way around.
    pub fn register(self: &Arc<Self>, logger: Arc<Logger>) {
        let id = logger.id().to_string();
        let replaced = self
            .loggers
            .insert(id.clone(), Arc::clone(&logger))
            .is_some();
        if replaced {
            tracing::warn!(logger_id = %id, "replaced logger already registered under this id");
        } else {
            tracing::debug!(logger_id = %id, level = %logger.level(), "logger registered");
        }

        if self.cache.contains(&id) {
            if let Some(level) = self.cache.level(&id) {
                if logger.level() != level {
                    tracing::debug!(logger_id = %id, %level, "applying cached level on register");
                    logger.set_level(level);
                }
            }
            return;
        }

        let Some(store) = self.store() else {
            return;
        };
        self.spawn_hydration(store, id, logger.level());
    }

    /// Fire-and-forget fetch of `id`'s stored config.
    fn spawn_hydration(self: &Arc<Self>, store: Arc<dyn Store>, id: String, default_level: Level) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(logger_id = %id, "no async runtime, skipping store hydration");
            return;
        };

        let issued_seq = self.cache.seq(&id);
        let registry = Arc::clone(self);
        handle.spawn(async move {
            match store.get(&id).await {
                Ok(config) => registry.finish_hydration(&id, config.level, issued_seq),
                Err(StoreError::NotFound { .. }) => {
                    // A write that landed while the fetch was in flight
                    // supersedes the runtime default.
                    if registry.cache.seq(&id) != issued_seq {
                        tracing::debug!(logger_id = %id, "skipping store back-fill, level written meanwhile");
                        return;
                    }
                    tracing::debug!(logger_id = %id, level = %default_level, "back-filling store from runtime default");
                    match store.set(StoredConfig::new(&id, Some(default_level))).await {
                        Ok(()) => {
                            registry
                                .cache
                                .record_if_unchanged(&id, Some(default_level), issued_seq);
                        }
                        Err(err) => {
                            tracing::warn!(logger_id = %id, %err, "store back-fill failed");
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(logger_id = %id, %err, "store hydration abandoned");
                }
            }
        });
    }

    /// Apply a resolved hydration fetch under the stale-write rule.
    fn finish_hydration(&self, id: &str, level: Option<Level>, issued_seq: u64) {
        if !self.cache.record_if_unchanged(id, level, issued_seq) {
            tracing::debug!(logger_id = %id, "dropping stale hydration result");
            return;
        }
        if let Some(level) = level {
            if let Some(logger) = self.loggers.get(id) {
                if logger.level() != level {
                    tracing::debug!(logger_id = %id, %level, "hydrated logger level from store");
                    logger.set_level(level);
                }
            }
        }
    }

    /// Attach a store, replacing any previously attached one.
    ///
    /// The prior change subscription is cancelled first so reconciliation
    /// callbacks are never duplicated. The store's full snapshot populates
    /// the local cache and is applied to every already-registered logger,
    /// then a change subscription is established when the store supports
    /// push. A failed `list()` leaves the store attached but the cache
    /// unpopulated; register-time hydration still works.
    pub async fn attach_store(self: &Arc<Self>, store: Arc<dyn Store>) {
        self.cancel_subscription();
        self.store.store(Arc::new(Some(Arc::clone(&store))));
        tracing::info!("store attached to registry");

        match store.list().await {
            Ok(configs) => {
                for config in configs {
                    self.apply_store_change(config);
                }
            }
            Err(err) => {
                tracing::warn!(%err, "store snapshot failed, cache not populated");
            }
        }

        let Some(mut changes) = store.subscribe_all() else {
            tracing::debug!("store does not support change subscription");
            return;
        };

        let registry: Weak<Registry> = Arc::downgrade(self);
        let task = tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(config) => {
                        let Some(registry) = registry.upgrade() else {
                            break;
                        };
                        registry.apply_store_change(config);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "store change subscription lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        if let Ok(mut subscription) = self.subscription.lock() {
            *subscription = Some(task);
        }
    }

    /// Alias for [`Registry::attach_store`], matching operational wording.
    pub async fn bootstrap(self: &Arc<Self>, store: Arc<dyn Store>) {
        self.attach_store(store).await;
    }

    /// Record a store-originated config in the cache and reconcile the live
    /// logger, when one exists and its level actually differs.
    fn apply_store_change(&self, config: StoredConfig) {
        self.cache.record(&config.id, config.level);
        let Some(level) = config.level else {
            return;
        };
        let Some(logger) = self.loggers.get(&config.id) else {
            // Config arrived before the logger was constructed; the cache
            // entry applies on a later register.
            tracing::debug!(logger_id = %config.id, "store change for unregistered logger, cached only");
            return;
        };
        if logger.level() != level {
            tracing::debug!(logger_id = %config.id, %level, "store change applied to live logger");
            logger.set_level(level);
        }
    }

    /// Operator-driven level change, written through to the store.
    ///
    /// Fails with [`Error::NoStoreAttached`] when there is nowhere durable
    /// to record the change. The cache and any live logger are updated
    /// synchronously so re-registrations observe the new level without
    /// waiting on the store round trip.
    pub async fn update(&self, id: &str, level: Level) -> Result<()> {
        let Some(store) = self.store() else {
            tracing::error!(logger_id = %id, "cannot update logger, no store attached");
            return Err(Error::NoStoreAttached);
        };

        tracing::info!(logger_id = %id, %level, "updating logger configuration");
        self.cache.record(id, Some(level));
        if let Some(logger) = self.loggers.get(id) {
            if logger.level() != level {
                logger.set_level(level);
            }
        }

        store.set(StoredConfig::new(id, Some(level))).await?;
        Ok(())
    }

    /// Remove the logger from the live map. Idempotent; the cache and the
    /// store keep their entries so a later re-registration picks the
    /// last-known level back up.
    pub fn unregister(&self, id: &str) {
        if self.loggers.remove(id).is_some() {
            tracing::debug!(logger_id = %id, "logger unregistered");
        } else {
            tracing::debug!(logger_id = %id, "unregister of unknown logger ignored");
        }
    }

    /// Full teardown: release the store subscription, detach the store,
    /// clear the live map and the cache.
    pub fn destroy(&self) {
        tracing::info!(logger_count = self.loggers.len(), "destroying registry");
        self.cancel_subscription();
        self.store.store(Arc::new(None));
        self.loggers.clear();
        self.cache.clear();
    }

    fn cancel_subscription(&self) {
        let Ok(mut subscription) = self.subscription.lock() else {
            return;
        };
        if let Some(task) = subscription.take() {
            task.abort();
            tracing::debug!("store change subscription cancelled");
        }
    }

    #[cfg(test)]
    pub(crate) fn cached_level(&self, id: &str) -> Option<Level> {
        self.cache.level(id)
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        self.cancel_subscription();
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("loggers", &self.loggers.len())
            .field("cached_levels", &self.cache.len())
            .field("store_attached", &self.store.load().is_some())
            .finish()
    }
}
