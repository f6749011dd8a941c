//! Event formatting.
//!
//! Formatters turn an [`Event`](crate::event::Event) into a displayable
//! string. Sinks may use one or render events themselves.

mod dev;

pub use dev::DevFormatter;

use crate::event::Event;

/// Formats log events for display.
pub trait Formatter: Send + Sync {
    /// Render the event as a single display string.
    fn format(&self, event: &Event) -> String;
}
