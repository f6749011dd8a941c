//! Log severity levels and their total order.
//!
//! # Responsibilities
//! - Define the six severity levels, least to most severe
//! - Provide the ordinal comparison used by every filtering decision
//! - Parse and validate level tokens arriving from strings (env, stores)
//!
//! # Design Decisions
//! - Ordering comes from the declaration order (`repr(u8)`), never from
//!   lexical comparison of the token strings
//! - Invalid tokens are a typed parse error; callers at string boundaries
//!   decide whether to diagnose-and-keep-previous or propagate

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Log severity level, ordered least to most severe.
#[repr(u8)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

/// All levels in ascending severity order.
pub const LEVELS: [Level; 6] = [
    Level::Trace,
    Level::Debug,
    Level::Info,
    Level::Warn,
    Level::Error,
    Level::Fatal,
];

impl Level {
    /// Return true if `self` is at or above `threshold` in severity.
    ///
    /// This single predicate backs both the per-logger floor check and the
    /// process-wide floor check; an event must pass both to be dispatched.
    pub fn is_at_least(self, threshold: Level) -> bool {
        self as u8 >= threshold as u8
    }

    /// The lowercase token for this level.
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the six level tokens.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid log level {token:?}, expected one of trace|debug|info|warn|error|fatal")]
pub struct LevelParseError {
    /// The rejected token.
    pub token: String,
}

impl FromStr for Level {
    type Err = LevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            _ => Err(LevelParseError {
                token: s.to_string(),
            }),
        }
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level as u8
    }
}

impl TryFrom<u8> for Level {
    type Error = u8;

    fn try_from(val: u8) -> Result<Self, u8> {
        match val {
            0 => Ok(Level::Trace),
            1 => Ok(Level::Debug),
            2 => Ok(Level::Info),
            3 => Ok(Level::Warn),
            4 => Ok(Level::Error),
            5 => Ok(Level::Fatal),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_matches_declaration() {
        for window in LEVELS.windows(2) {
            assert!(window[0] < window[1]);
        }
    }

    #[test]
    fn test_is_at_least_boundaries() {
        assert!(!Level::Trace.is_at_least(Level::Fatal));
        assert!(Level::Fatal.is_at_least(Level::Trace));
        for level in LEVELS {
            assert!(level.is_at_least(level));
        }
    }

    #[test]
    fn test_is_at_least_agrees_with_ord() {
        for a in LEVELS {
            for b in LEVELS {
                assert_eq!(a.is_at_least(b), a >= b);
            }
        }
    }

    #[test]
    fn test_parse_round_trip() {
        for level in LEVELS {
            assert_eq!(level.as_str().parse::<Level>().unwrap(), level);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("WARN".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!("Info".parse::<Level>().unwrap(), Level::Info);
    }

    #[test]
    fn test_parse_rejects_unknown_tokens() {
        let err = "verbose".parse::<Level>().unwrap_err();
        assert_eq!(err.token, "verbose");
        assert!("".parse::<Level>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_tokens() {
        assert_eq!(serde_json::to_string(&Level::Error).unwrap(), "\"error\"");
        let level: Level = serde_json::from_str("\"debug\"").unwrap();
        assert_eq!(level, Level::Debug);
        assert!(serde_json::from_str::<Level>("\"loud\"").is_err());
    }

    #[test]
    fn test_u8_conversion() {
        assert_eq!(u8::from(Level::Fatal), 5);
        assert_eq!(Level::try_from(2u8).unwrap(), Level::Info);
        assert_eq!(Level::try_from(9u8), Err(9));
    }
}
