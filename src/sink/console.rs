//! Console output sink.

use crate::event::Event;
use crate::format::Formatter;
use crate::level::Level;
use crate::sink::Sink;

/// Sink that writes events to the process console.
///
/// Error and fatal events go to stderr, everything else to stdout. Uses the
/// logger's formatter when one is configured, otherwise a plain rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }

    fn render_plain(event: &Event) -> String {
        let mut out = format!(
            "[{}] {} {}",
            event.level.as_str().to_uppercase(),
            event.logger_id,
            event.message
        );
        for arg in &event.args {
            out.push(' ');
            out.push_str(&arg.to_string());
        }
        if let Some(error) = &event.error {
            out.push_str(" error=");
            out.push_str(&error.message);
        }
        out
    }
}

impl Sink for ConsoleSink {
    fn write(&self, event: &Event, formatter: Option<&dyn Formatter>) {
        let line = match formatter {
            Some(f) => f.format(event),
            None => Self::render_plain(event),
        };
        if event.level.is_at_least(Level::Error) {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}
