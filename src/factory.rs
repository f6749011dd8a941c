//! Logger factory: shared defaults plus registry participation.
//!
//! A factory captures the sinks, hooks, formatter and default level that
//! every logger in a subsystem should share, and registers each created
//! logger in a [`Registry`] when one is configured. Children of
//! factory-created loggers route back through the factory, so the whole
//! hierarchy participates in the same registry/store lifecycle.

use crate::globals::GlobalControls;
use crate::logger::{ConfigOverride, Logger, LoggerConfig};
use crate::registry::Registry;
use std::sync::Arc;

/// Configuration for building a [`LoggerFactory`].
#[derive(Clone)]
pub struct FactoryConfig {
    /// Defaults applied to every created logger, unless overridden.
    pub defaults: ConfigOverride,
    /// Registry that created loggers are registered in.
    pub registry: Option<Arc<Registry>>,
    /// Shared process-wide controls handed to every logger.
    pub globals: Arc<GlobalControls>,
}

impl FactoryConfig {
    pub fn new(globals: Arc<GlobalControls>) -> Self {
        Self {
            defaults: ConfigOverride::default(),
            registry: None,
            globals,
        }
    }
}

/// Creates loggers from shared defaults and registers them.
pub struct LoggerFactory {
    defaults: ConfigOverride,
    registry: Option<Arc<Registry>>,
    globals: Arc<GlobalControls>,
}

impl LoggerFactory {
    pub fn new(config: FactoryConfig) -> Arc<Self> {
        Arc::new(Self {
            defaults: config.defaults,
            registry: config.registry,
            globals: config.globals,
        })
    }

    /// The registry created loggers are registered in, when configured.
    pub fn registry(&self) -> Option<&Arc<Registry>> {
        self.registry.as_ref()
    }

    /// Create and register a logger with the factory defaults.
    pub fn create_logger(self: &Arc<Self>, id: impl Into<String>) -> Arc<Logger> {
        self.create_logger_with(id, ConfigOverride::default())
    }

    /// Create and register a logger, with per-logger overrides taking
    /// precedence over the factory defaults.
    pub fn create_logger_with(
        self: &Arc<Self>,
        id: impl Into<String>,
        overrides: ConfigOverride,
    ) -> Arc<Logger> {
        let config = LoggerConfig {
            id: id.into(),
            level: overrides.level.or(self.defaults.level),
            sinks: overrides
                .sinks
                .or_else(|| self.defaults.sinks.clone())
                .unwrap_or_default(),
            hooks: overrides
                .hooks
                .or_else(|| self.defaults.hooks.clone())
                .unwrap_or_default(),
            formatter: overrides
                .formatter
                .or_else(|| self.defaults.formatter.clone()),
            type_tag: overrides
                .type_tag
                .or_else(|| self.defaults.type_tag.clone()),
            globals: Arc::clone(&self.globals),
        };
        self.create_from_config(config)
    }

    /// Build a logger from a fully resolved config. Used by
    /// [`Logger::child`] so children inherit parent state, not factory
    /// defaults.
    pub(crate) fn create_from_config(self: &Arc<Self>, config: LoggerConfig) -> Arc<Logger> {
        tracing::debug!(logger_id = %config.id, "creating logger");
        let logger = Logger::new(config);
        logger.attach_factory(self);
        if let Some(registry) = &self.registry {
            registry.register(Arc::clone(&logger));
        }
        logger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::sink::MemorySink;

    #[test]
    fn test_factory_applies_defaults_and_overrides() {
        let sink = MemorySink::new();
        let mut config = FactoryConfig::new(GlobalControls::new());
        config.defaults.level = Some(Level::Info);
        config.defaults.sinks = Some(vec![Arc::new(sink.clone())]);
        let factory = LoggerFactory::new(config);

        let logger = factory.create_logger("svc");
        assert_eq!(logger.level(), Level::Info);
        logger.info("delivered");
        assert_eq!(sink.len(), 1);

        let quiet = factory.create_logger_with(
            "svc.quiet",
            ConfigOverride {
                level: Some(Level::Fatal),
                ..Default::default()
            },
        );
        assert_eq!(quiet.level(), Level::Fatal);
    }

    #[tokio::test]
    async fn test_factory_registers_created_loggers() {
        let registry = Registry::new();
        let mut config = FactoryConfig::new(GlobalControls::new());
        config.registry = Some(Arc::clone(&registry));
        let factory = LoggerFactory::new(config);

        let logger = factory.create_logger("api");
        let found = registry.get("api").unwrap();
        assert!(Arc::ptr_eq(&logger, &found));
    }

    #[tokio::test]
    async fn test_children_route_through_the_factory() {
        let registry = Registry::new();
        let mut config = FactoryConfig::new(GlobalControls::new());
        config.registry = Some(Arc::clone(&registry));
        let factory = LoggerFactory::new(config);

        let parent = factory.create_logger("api");
        let child = parent.child("worker", ConfigOverride::default());

        assert_eq!(child.id(), "api.worker");
        assert!(registry.has("api.worker"));
        assert!(child.factory().is_some());
    }
}
