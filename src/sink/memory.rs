//! In-memory capture sink for tests and assertions.

use crate::event::Event;
use crate::format::Formatter;
use crate::sink::Sink;
use std::sync::{Arc, Mutex};

/// Sink that records every event it receives.
///
/// Clones share the same buffer, so a test can keep one handle and attach
/// another to a logger.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<Event>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured events, in arrival order.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().expect("memory sink poisoned").clone()
    }

    /// Number of captured events.
    pub fn len(&self) -> usize {
        self.events.lock().expect("memory sink poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all captured events.
    pub fn clear(&self) {
        self.events.lock().expect("memory sink poisoned").clear();
    }
}

impl Sink for MemorySink {
    fn write(&self, event: &Event, _formatter: Option<&dyn Formatter>) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
