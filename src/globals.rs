//! Process-wide logging controls.
//!
//! # Responsibilities
//! - Hold the global on/off switch and the process-wide level floor
//! - Apply environment overrides at startup without aborting on bad input
//!
//! # Design Decisions
//! - One explicitly-owned handle (`Arc<GlobalControls>`) instead of ambient
//!   statics; every logger takes the handle at construction
//! - Initialization order: defaults, then environment, then runtime API

use crate::level::Level;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

/// Environment variable that disables all logging when set to `1`/`true`.
pub const ENV_DISABLED: &str = "LOGKIT_DISABLED";
/// Environment variable naming the initial process-wide floor level.
pub const ENV_LEVEL: &str = "LOGKIT_LEVEL";

/// Shared process-wide enable flag and level floor.
#[derive(Debug)]
pub struct GlobalControls {
    enabled: AtomicBool,
    level: AtomicU8,
}

impl Default for GlobalControls {
    fn default() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            level: AtomicU8::new(Level::Trace as u8),
        }
    }
}

impl GlobalControls {
    /// Create controls with the built-in defaults: enabled, floor `trace`.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create controls with defaults overridden by the environment.
    ///
    /// Malformed values are ignored with a diagnostic; startup never aborts
    /// over a bad toggle.
    pub fn from_env() -> Arc<Self> {
        let controls = Self::default();

        if let Ok(raw) = std::env::var(ENV_DISABLED) {
            match raw.as_str() {
                "1" | "true" => controls.enabled.store(false, Ordering::Relaxed),
                "0" | "false" => controls.enabled.store(true, Ordering::Relaxed),
                other => {
                    tracing::warn!(value = %other, var = ENV_DISABLED, "ignoring malformed env toggle");
                }
            }
        }

        if let Ok(raw) = std::env::var(ENV_LEVEL) {
            match raw.parse::<Level>() {
                Ok(level) => controls.level.store(level as u8, Ordering::Relaxed),
                Err(err) => {
                    tracing::warn!(%err, var = ENV_LEVEL, "ignoring invalid env level");
                }
            }
        }

        Arc::new(controls)
    }

    /// Whether logging is globally enabled.
    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Enable or disable logging globally.
    pub fn set_enabled(&self, value: bool) {
        self.enabled.store(value, Ordering::Relaxed);
    }

    /// The process-wide level floor.
    pub fn level(&self) -> Level {
        // The cell only ever holds a value written from a Level.
        Level::try_from(self.level.load(Ordering::Relaxed)).unwrap_or(Level::Trace)
    }

    /// Replace the process-wide level floor.
    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    /// Replace the floor from a string token.
    ///
    /// Invalid tokens are rejected with a diagnostic and the previous floor
    /// stays active.
    pub fn set_level_str(&self, token: &str) {
        match token.parse::<Level>() {
            Ok(level) => self.set_level(level),
            Err(err) => {
                tracing::warn!(%err, "global floor unchanged");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let controls = GlobalControls::new();
        assert!(controls.enabled());
        assert_eq!(controls.level(), Level::Trace);
    }

    #[test]
    fn test_runtime_overrides() {
        let controls = GlobalControls::new();
        controls.set_enabled(false);
        controls.set_level(Level::Warn);
        assert!(!controls.enabled());
        assert_eq!(controls.level(), Level::Warn);
    }

    #[test]
    fn test_invalid_token_keeps_previous_floor() {
        let controls = GlobalControls::new();
        controls.set_level(Level::Error);
        controls.set_level_str("shout");
        assert_eq!(controls.level(), Level::Error);
        controls.set_level_str("debug");
        assert_eq!(controls.level(), Level::Debug);
    }

    #[test]
    fn test_env_bootstrap() {
        // Env vars are process-global, so exercise both in one test.
        std::env::set_var(ENV_DISABLED, "true");
        std::env::set_var(ENV_LEVEL, "warn");
        let controls = GlobalControls::from_env();
        assert!(!controls.enabled());
        assert_eq!(controls.level(), Level::Warn);

        std::env::set_var(ENV_DISABLED, "maybe");
        std::env::set_var(ENV_LEVEL, "loudest");
        let controls = GlobalControls::from_env();
        assert!(controls.enabled());
        assert_eq!(controls.level(), Level::Trace);

        std::env::remove_var(ENV_DISABLED);
        std::env::remove_var(ENV_LEVEL);
    }
}
