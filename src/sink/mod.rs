//! Event sinks and side-effect hooks.
//!
//! # Responsibilities
//! - Define the `Sink` contract: receive a dispatched event and output it
//! - Define the `Hook` contract: per-event side effects whose failures are
//!   diagnosed but never reach the logging caller
//!
//! # Design Decisions
//! - Sinks run synchronously in registration order; there is no buffering or
//!   retry, delivery is best-effort
//! - A hook may hand back deferred work; the logger spawns it and only ever
//!   reports its failure, it never awaits it inline

mod console;
mod memory;

pub use console::ConsoleSink;
pub use memory::MemorySink;

use crate::event::Event;
use crate::format::Formatter;
use futures_util::future::BoxFuture;

/// A destination that receives and outputs dispatched events.
pub trait Sink: Send + Sync {
    /// Write one event, optionally rendered through `formatter`.
    fn write(&self, event: &Event, formatter: Option<&dyn Formatter>);
}

/// The result of invoking a hook.
pub enum HookOutcome {
    /// The side effect completed inline.
    Done,
    /// The side effect continues in the background; its eventual failure is
    /// diagnosed and dropped.
    Deferred(BoxFuture<'static, Result<(), Box<dyn std::error::Error + Send + Sync>>>),
}

/// A side-effect callback invoked for every dispatched event.
pub trait Hook: Send + Sync {
    /// React to a dispatched event.
    fn on_log(&self, event: &Event) -> HookOutcome;
}
