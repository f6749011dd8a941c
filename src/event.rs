//! Log event records and their auxiliary arguments.
//!
//! # Responsibilities
//! - Define the `Event` record handed to sinks and hooks
//! - Capture error values with their source chain
//! - Separate "the" error from plain auxiliary arguments before dispatch

use crate::level::Level;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

/// A single log event as delivered to sinks and hooks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Id of the logger that emitted the event.
    pub logger_id: String,
    /// Severity of the event.
    pub level: Level,
    /// Human-readable message.
    pub message: String,
    /// Plain auxiliary arguments, in the order they were supplied.
    pub args: Vec<Value>,
    /// At most one error attached to the event.
    pub error: Option<ErrorInfo>,
    /// Milliseconds since the UNIX epoch.
    pub timestamp_ms: u64,
}

impl Event {
    /// Build an event stamped with the current wall-clock time.
    pub fn new(
        logger_id: impl Into<String>,
        level: Level,
        message: impl Into<String>,
        details: Vec<Detail>,
    ) -> Self {
        let (args, error) = split_error(details);
        Self {
            logger_id: logger_id.into(),
            level,
            message: message.into(),
            args,
            error,
            timestamp_ms: now_ms(),
        }
    }
}

/// A captured error: display message plus the source chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Top-level error message.
    pub message: String,
    /// Messages of `source()` errors, outermost first.
    pub chain: Vec<String>,
}

impl ErrorInfo {
    /// Capture an error and walk its source chain.
    pub fn capture(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut chain = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }
        Self {
            message: err.to_string(),
            chain,
        }
    }
}

/// One auxiliary argument to a log call: either a plain value or an error.
#[derive(Debug, Clone)]
pub enum Detail {
    /// A structured value carried through to sinks unchanged.
    Value(Value),
    /// An error-like argument, eligible to become the event's error.
    Error(ErrorInfo),
}

impl Detail {
    /// Capture any error as a detail.
    pub fn error(err: &(dyn std::error::Error + 'static)) -> Self {
        Detail::Error(ErrorInfo::capture(err))
    }

    /// Serialize any value; falls back to its `Debug` rendering if the
    /// serialization fails, so a log call can never error out.
    pub fn value<T: Serialize + std::fmt::Debug>(val: T) -> Self {
        match serde_json::to_value(&val) {
            Ok(v) => Detail::Value(v),
            Err(_) => Detail::Value(Value::String(format!("{val:?}"))),
        }
    }
}

impl From<Value> for Detail {
    fn from(value: Value) -> Self {
        Detail::Value(value)
    }
}

impl From<ErrorInfo> for Detail {
    fn from(info: ErrorInfo) -> Self {
        Detail::Error(info)
    }
}

/// Separate at most the first error-like detail from plain arguments.
///
/// The first error encountered becomes "the" event error; any further error
/// details are downgraded to plain string values and keep their position.
pub fn split_error(details: Vec<Detail>) -> (Vec<Value>, Option<ErrorInfo>) {
    let mut error = None;
    let mut args = Vec::with_capacity(details.len());
    for detail in details {
        match detail {
            Detail::Value(v) => args.push(v),
            Detail::Error(info) => {
                if error.is_none() {
                    error = Some(info);
                } else {
                    args.push(Value::String(info.message));
                }
            }
        }
    }
    (args, error)
}

/// Current wall-clock time in milliseconds since the UNIX epoch.
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
