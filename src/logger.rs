//! Named loggers: level filtering and fan-out to sinks and hooks.
//!
//! # Data Flow
//! ```text
//! logger.warn("...") / logger.log(level, msg, details)
//!     → global enabled check
//!     → level floor checks (logger floor AND process-wide floor)
//!     → Event built (error split from plain details)
//!     → every sink, in registration order
//!     → every hook, fire-and-forget, failures diagnosed only
//! ```
//!
//! # Design Decisions
//! - The floor is an atomic so the registry can retune it while events flow
//! - Sink and hook lists are arc-swapped: read on every event, written rarely
//! - A log call can never panic or error into the caller; sink panics and
//!   hook failures are caught and diagnosed

use crate::event::{Detail, Event};
use crate::factory::LoggerFactory;
use crate::format::Formatter;
use crate::globals::GlobalControls;
use crate::level::Level;
use crate::sink::{Hook, HookOutcome, Sink};
use arc_swap::ArcSwap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock, Weak};

/// Default floor for loggers constructed without an explicit level.
pub const DEFAULT_LEVEL: Level = Level::Warn;

/// Construction-time configuration for a [`Logger`].
///
/// Only `level` ever persists to a store; everything else is runtime-only.
#[derive(Clone)]
pub struct LoggerConfig {
    /// Immutable logger id; children append `.child` segments.
    pub id: String,
    /// Initial floor; defaults to [`DEFAULT_LEVEL`] when `None`.
    pub level: Option<Level>,
    /// Ordered output destinations.
    pub sinks: Vec<Arc<dyn Sink>>,
    /// Side-effect hooks, invoked after sinks.
    pub hooks: Vec<Arc<dyn Hook>>,
    /// Optional formatter handed to sinks.
    pub formatter: Option<Arc<dyn Formatter>>,
    /// Free-form tag, e.g. a subsystem kind.
    pub type_tag: Option<String>,
    /// Shared process-wide controls.
    pub globals: Arc<GlobalControls>,
}

impl LoggerConfig {
    pub fn new(id: impl Into<String>, globals: Arc<GlobalControls>) -> Self {
        Self {
            id: id.into(),
            level: None,
            sinks: Vec::new(),
            hooks: Vec::new(),
            formatter: None,
            type_tag: None,
            globals,
        }
    }
}

/// Partial configuration used by [`Logger::child`] and factory overrides.
///
/// `None` fields inherit from the parent or factory defaults.
#[derive(Clone, Default)]
pub struct ConfigOverride {
    pub level: Option<Level>,
    pub sinks: Option<Vec<Arc<dyn Sink>>>,
    pub hooks: Option<Vec<Arc<dyn Hook>>>,
    pub formatter: Option<Arc<dyn Formatter>>,
    pub type_tag: Option<String>,
}

/// A named logging unit with a mutable level floor.
pub struct Logger {
    id: String,
    floor: AtomicU8,
    sinks: ArcSwap<Vec<Arc<dyn Sink>>>,
    hooks: ArcSwap<Vec<Arc<dyn Hook>>>,
    formatter: ArcSwap<Option<Arc<dyn Formatter>>>,
    type_tag: Option<String>,
    globals: Arc<GlobalControls>,
    factory: OnceLock<Weak<LoggerFactory>>,
}

impl Logger {
    pub fn new(config: LoggerConfig) -> Arc<Self> {
        Arc::new(Self {
            id: config.id,
            floor: AtomicU8::new(config.level.unwrap_or(DEFAULT_LEVEL) as u8),
            sinks: ArcSwap::from_pointee(config.sinks),
            hooks: ArcSwap::from_pointee(config.hooks),
            formatter: ArcSwap::from_pointee(config.formatter),
            type_tag: config.type_tag,
            globals: config.globals,
            factory: OnceLock::new(),
        })
    }

    /// The immutable logger id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The free-form type tag, when one was set.
    pub fn type_tag(&self) -> Option<&str> {
        self.type_tag.as_deref()
    }

    /// Current minimum level floor.
    pub fn level(&self) -> Level {
        // The cell only ever holds a value written from a Level.
        Level::try_from(self.floor.load(Ordering::Relaxed)).unwrap_or(DEFAULT_LEVEL)
    }

    /// Replace the floor.
    pub fn set_level(&self, level: Level) {
        self.floor.store(level as u8, Ordering::Relaxed);
    }

    /// Replace the floor from a string token.
    ///
    /// Invalid tokens are rejected with a diagnostic; the previous floor
    /// stays active. Never errors back to the caller.
    pub fn set_level_str(&self, token: &str) {
        match token.parse::<Level>() {
            Ok(level) => self.set_level(level),
            Err(err) => {
                tracing::warn!(logger_id = %self.id, %err, "logger floor unchanged");
            }
        }
    }

    /// Replace the sink list. Owner-side mutation; the registry never calls
    /// this.
    pub fn set_sinks(&self, sinks: Vec<Arc<dyn Sink>>) {
        self.sinks.store(Arc::new(sinks));
    }

    /// Replace the hook list.
    pub fn set_hooks(&self, hooks: Vec<Arc<dyn Hook>>) {
        self.hooks.store(Arc::new(hooks));
    }

    /// Replace or clear the formatter.
    pub fn set_formatter(&self, formatter: Option<Arc<dyn Formatter>>) {
        self.formatter.store(Arc::new(formatter));
    }

    /// The factory this logger was created through, if it is still alive.
    pub fn factory(&self) -> Option<Arc<LoggerFactory>> {
        self.factory.get().and_then(Weak::upgrade)
    }

    /// Attach the creating factory. Called once by the factory itself.
    pub(crate) fn attach_factory(&self, factory: &Arc<LoggerFactory>) {
        let _ = self.factory.set(Arc::downgrade(factory));
    }

    /// Create a child logger with id `parent.child`.
    ///
    /// Unset override fields inherit the parent's current sinks, hooks,
    /// formatter, level and type tag. A child of a factory-created logger is
    /// created through the same factory so it participates in the same
    /// registry lifecycle.
    pub fn child(&self, child_id: &str, overrides: ConfigOverride) -> Arc<Logger> {
        let config = LoggerConfig {
            id: format!("{}.{}", self.id, child_id),
            level: Some(overrides.level.unwrap_or_else(|| self.level())),
            sinks: overrides
                .sinks
                .unwrap_or_else(|| self.sinks.load().as_ref().clone()),
            hooks: overrides
                .hooks
                .unwrap_or_else(|| self.hooks.load().as_ref().clone()),
            formatter: overrides
                .formatter
                .or_else(|| self.formatter.load().as_ref().clone()),
            type_tag: overrides.type_tag.or_else(|| self.type_tag.clone()),
            globals: Arc::clone(&self.globals),
        };

        match self.factory() {
            Some(factory) => factory.create_from_config(config),
            None => Logger::new(config),
        }
    }

    /// Emit an event with auxiliary details.
    ///
    /// At most the first error-like detail becomes the event's error; the
    /// rest pass through as plain arguments. This call never panics and
    /// never returns an error, whatever the input.
    pub fn log(&self, level: Level, message: impl Into<String>, details: Vec<Detail>) {
        if !self.globals.enabled() {
            return;
        }
        // Both floors must pass; a filtered call has no side effect at all.
        if !level.is_at_least(self.level()) || !level.is_at_least(self.globals.level()) {
            return;
        }

        let event = Event::new(&self.id, level, message, details);
        self.dispatch(&event);
    }

    pub fn trace(&self, message: impl Into<String>) {
        self.log(Level::Trace, message, Vec::new());
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::Debug, message, Vec::new());
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::Info, message, Vec::new());
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(Level::Warn, message, Vec::new());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::Error, message, Vec::new());
    }

    pub fn fatal(&self, message: impl Into<String>) {
        self.log(Level::Fatal, message, Vec::new());
    }

    fn dispatch(&self, event: &Event) {
        let formatter = self.formatter.load().as_ref().clone();

        for sink in self.sinks.load().iter() {
            let result = catch_unwind(AssertUnwindSafe(|| {
                sink.write(event, formatter.as_deref());
            }));
            if result.is_err() {
                tracing::warn!(logger_id = %self.id, "sink panicked during dispatch");
            }
        }

        for hook in self.hooks.load().iter() {
            match catch_unwind(AssertUnwindSafe(|| hook.on_log(event))) {
                Ok(HookOutcome::Done) => {}
                Ok(HookOutcome::Deferred(work)) => {
                    let logger_id = self.id.clone();
                    match tokio::runtime::Handle::try_current() {
                        Ok(handle) => {
                            handle.spawn(async move {
                                if let Err(err) = work.await {
                                    tracing::warn!(%logger_id, %err, "log hook failed");
                                }
                            });
                        }
                        Err(_) => {
                            tracing::debug!(%logger_id, "deferred hook work dropped outside runtime");
                        }
                    }
                }
                Err(_) => {
                    tracing::warn!(logger_id = %self.id, "log hook panicked");
                }
            }
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("id", &self.id)
            .field("level", &self.level())
            .field("type_tag", &self.type_tag)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    fn logger_with_sink(level: Level) -> (Arc<Logger>, MemorySink) {
        let sink = MemorySink::new();
        let mut config = LoggerConfig::new("test", GlobalControls::new());
        config.level = Some(level);
        config.sinks = vec![Arc::new(sink.clone())];
        (Logger::new(config), sink)
    }

    #[test]
    fn test_floor_filters_events() {
        let (logger, sink) = logger_with_sink(Level::Warn);
        logger.info("below floor");
        assert!(sink.is_empty());
        logger.warn("at floor");
        logger.error("above floor");
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_global_floor_also_applies() {
        let sink = MemorySink::new();
        let globals = GlobalControls::new();
        globals.set_level(Level::Error);
        let mut config = LoggerConfig::new("test", globals);
        config.level = Some(Level::Trace);
        config.sinks = vec![Arc::new(sink.clone())];
        let logger = Logger::new(config);

        // Passes the logger floor but not the global floor.
        logger.warn("filtered");
        assert!(sink.is_empty());
        logger.error("passes both");
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_disabled_is_a_no_op() {
        let (logger, sink) = logger_with_sink(Level::Trace);
        logger.fatal("seen");
        assert_eq!(sink.len(), 1);

        // Logger holds the same globals handle it was built with.
        let globals = GlobalControls::new();
        let mut config = LoggerConfig::new("off", Arc::clone(&globals));
        config.level = Some(Level::Trace);
        config.sinks = vec![Arc::new(sink.clone())];
        let logger = Logger::new(config);
        globals.set_enabled(false);
        logger.fatal("unseen");
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_sinks_receive_in_registration_order() {
        let first = MemorySink::new();
        let second = MemorySink::new();

        struct Tagging {
            inner: MemorySink,
            order: Arc<std::sync::Mutex<Vec<&'static str>>>,
            tag: &'static str,
        }
        impl Sink for Tagging {
            fn write(&self, event: &Event, formatter: Option<&dyn Formatter>) {
                self.order.lock().unwrap().push(self.tag);
                self.inner.write(event, formatter);
            }
        }

        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut config = LoggerConfig::new("ordered", GlobalControls::new());
        config.level = Some(Level::Info);
        config.sinks = vec![
            Arc::new(Tagging {
                inner: first.clone(),
                order: Arc::clone(&order),
                tag: "first",
            }),
            Arc::new(Tagging {
                inner: second.clone(),
                order: Arc::clone(&order),
                tag: "second",
            }),
        ];
        let logger = Logger::new(config);

        logger.warn("one event");
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_set_level_str_keeps_previous_on_invalid() {
        let (logger, _sink) = logger_with_sink(Level::Warn);
        logger.set_level_str("chatty");
        assert_eq!(logger.level(), Level::Warn);
        logger.set_level_str("debug");
        assert_eq!(logger.level(), Level::Debug);
    }

    #[test]
    fn test_child_inherits_and_overrides() {
        let sink = MemorySink::new();
        let mut config = LoggerConfig::new("parent", GlobalControls::new());
        config.level = Some(Level::Info);
        config.sinks = vec![Arc::new(sink.clone())];
        config.type_tag = Some("service".into());
        let parent = Logger::new(config);

        let child = parent.child("worker", ConfigOverride::default());
        assert_eq!(child.id(), "parent.worker");
        assert_eq!(child.level(), Level::Info);
        assert_eq!(child.type_tag(), Some("service"));

        child.info("through inherited sink");
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.events()[0].logger_id, "parent.worker");

        let quiet = parent.child(
            "quiet",
            ConfigOverride {
                level: Some(Level::Fatal),
                ..Default::default()
            },
        );
        quiet.error("filtered");
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_panicking_sink_does_not_reach_caller() {
        struct Exploding;
        impl Sink for Exploding {
            fn write(&self, _event: &Event, _formatter: Option<&dyn Formatter>) {
                panic!("sink bug");
            }
        }

        let survivor = MemorySink::new();
        let mut config = LoggerConfig::new("sturdy", GlobalControls::new());
        config.level = Some(Level::Trace);
        config.sinks = vec![Arc::new(Exploding), Arc::new(survivor.clone())];
        let logger = Logger::new(config);

        logger.error("still delivered to later sinks");
        assert_eq!(survivor.len(), 1);
    }

    #[test]
    fn test_panicking_hook_is_isolated() {
        struct Exploding;
        impl Hook for Exploding {
            fn on_log(&self, _event: &Event) -> HookOutcome {
                panic!("hook bug");
            }
        }

        struct Counting(Arc<std::sync::atomic::AtomicUsize>);
        impl Hook for Counting {
            fn on_log(&self, _event: &Event) -> HookOutcome {
                self.0.fetch_add(1, Ordering::SeqCst);
                HookOutcome::Done
            }
        }

        let count = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let mut config = LoggerConfig::new("hooked", GlobalControls::new());
        config.level = Some(Level::Trace);
        config.hooks = vec![Arc::new(Exploding), Arc::new(Counting(Arc::clone(&count)))];
        let logger = Logger::new(config);

        logger.warn("hooks fire");
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_deferred_hook_failure_is_diagnosed_not_surfaced() {
        struct Failing;
        impl Hook for Failing {
            fn on_log(&self, _event: &Event) -> HookOutcome {
                HookOutcome::Deferred(Box::pin(async { Err("remote sink down".into()) }))
            }
        }

        let mut config = LoggerConfig::new("deferred", GlobalControls::new());
        config.level = Some(Level::Trace);
        config.hooks = vec![Arc::new(Failing)];
        let logger = Logger::new(config);

        // Must not panic or error; the failure is only diagnosed.
        logger.info("spawns the deferred work");
        tokio::task::yield_now().await;
    }
}
