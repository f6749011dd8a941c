//! logkit — structured logging with store-backed level configuration.
//!
//! Named loggers filter leveled events to pluggable sinks, while a registry
//! keeps every live logger's minimum level reconciled with an asynchronous,
//! possibly external configuration store.
//!
//! # Architecture Overview
//!
//! ```text
//!   logger.warn("...")                         operator / other process
//!        │                                              │
//!        ▼                                              ▼
//!   ┌─────────┐   floor checks   ┌─────────┐      ┌───────────┐
//!   │ Logger  │─────────────────▶│  sinks  │      │   Store   │
//!   │ (floor) │                  │ + hooks │      │ (get/set/ │
//!   └────┬────┘                  └─────────┘      │  list/sub)│
//!        │ register                               └─────┬─────┘
//!        ▼                                              │
//!   ┌──────────────────────────────────────────────────┐│
//!   │                   Registry                       ││
//!   │  live map ── local level cache ── subscription ◀─┘│
//!   │      ▲              │                             │
//!   │      └── reconcile ◀┘  (bootstrap, hydration,     │
//!   │                         pushed changes, update)   │
//!   └──────────────────────────────────────────────────┘
//! ```
//!
//! Levels flow one way: the store is the durable source of truth, the
//! registry's local cache makes it readable without an async round trip,
//! and live loggers converge onto it. Event dispatch never waits on any of
//! this; a slow or broken store degrades verbosity control, not logging.
//!
//! # Example
//!
//! ```no_run
//! use logkit::{
//!     ConfigOverride, ConsoleSink, FactoryConfig, FileStore, GlobalControls,
//!     Level, LoggerFactory, Registry,
//! };
//! use std::sync::Arc;
//!
//! # async fn run() {
//! let globals = GlobalControls::from_env();
//! let registry = Registry::new();
//! registry
//!     .attach_store(Arc::new(FileStore::new("loggers.json")))
//!     .await;
//!
//! let mut factory_config = FactoryConfig::new(globals);
//! factory_config.registry = Some(Arc::clone(&registry));
//! factory_config.defaults.sinks = Some(vec![Arc::new(ConsoleSink::new())]);
//! factory_config.defaults.level = Some(Level::Info);
//! let factory = LoggerFactory::new(factory_config);
//!
//! let logger = factory.create_logger("api");
//! logger.info("listening");
//!
//! let worker = logger.child("worker", ConfigOverride::default());
//! worker.debug("filtered until someone turns the level up");
//!
//! // Durable, takes effect immediately and on every future registration:
//! registry.update("api.worker", Level::Debug).await.unwrap();
//! # }
//! ```

// Core subsystems
pub mod error;
pub mod event;
pub mod level;
pub mod logger;
pub mod registry;
pub mod store;

// Output plumbing
pub mod format;
pub mod sink;

// Cross-cutting concerns
pub mod factory;
pub mod globals;

pub use error::{Error, Result};
pub use event::{Detail, ErrorInfo, Event};
pub use factory::{FactoryConfig, LoggerFactory};
pub use format::{DevFormatter, Formatter};
pub use globals::GlobalControls;
pub use level::{Level, LevelParseError, LEVELS};
pub use logger::{ConfigOverride, Logger, LoggerConfig, DEFAULT_LEVEL};
pub use registry::Registry;
pub use sink::{ConsoleSink, Hook, HookOutcome, MemorySink, Sink};
pub use store::{FileStore, MemoryStore, Store, StoreError, StoreResult, StoredConfig};
