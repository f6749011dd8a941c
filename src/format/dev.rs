//! Development formatter with ANSI colors for terminal output.

use crate::event::Event;
use crate::format::Formatter;
use crate::level::Level;

const RESET: &str = "\x1b[0m";

fn color(level: Level) -> &'static str {
    match level {
        Level::Trace => "\x1b[90m",
        Level::Debug => "\x1b[36m",
        Level::Info => "\x1b[32m",
        Level::Warn => "\x1b[33m",
        Level::Error => "\x1b[31m",
        Level::Fatal => "\x1b[41m",
    }
}

/// ANSI-colored formatter for development terminals.
///
/// Renders `[LEVEL] timestamp logger_id message args` with the level tag
/// colored by severity, followed by the error and its source chain when one
/// is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct DevFormatter;

impl DevFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Formatter for DevFormatter {
    fn format(&self, event: &Event) -> String {
        let mut out = format!(
            "{}[{}]{} {} {} {}",
            color(event.level),
            event.level.as_str().to_uppercase(),
            RESET,
            event.timestamp_ms,
            event.logger_id,
            event.message,
        );

        for arg in &event.args {
            out.push(' ');
            out.push_str(&arg.to_string());
        }

        if let Some(error) = &event.error {
            out.push_str("\n  error: ");
            out.push_str(&error.message);
            for cause in &error.chain {
                out.push_str("\n  caused by: ");
                out.push_str(cause);
            }
        }

        out
    }
}
