//! Local level cache with per-id write sequencing.
//!
//! The cache lets the registry answer "what level should this id have"
//! synchronously, without an async store round trip. Each entry carries a
//! sequence counter bumped on every authoritative write; in-flight hydration
//! fetches capture the counter when they are issued and are discarded if it
//! moved, so a stale fetch result can never overwrite a fresher write.

use crate::level::Level;
use dashmap::DashMap;

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    level: Option<Level>,
    seq: u64,
}

/// Id → last-known level, with stale-write protection.
#[derive(Debug, Default)]
pub(crate) struct LevelCache {
    entries: DashMap<String, CacheEntry>,
}

impl LevelCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The cached level for `id`, when one is known.
    pub(crate) fn level(&self, id: &str) -> Option<Level> {
        self.entries.get(id).and_then(|entry| entry.level)
    }

    /// True when any entry exists for `id`, even a level-less one.
    pub(crate) fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Current sequence for `id`; zero when the id was never written.
    pub(crate) fn seq(&self, id: &str) -> u64 {
        self.entries.get(id).map(|entry| entry.seq).unwrap_or(0)
    }

    /// Authoritative write: set the level and bump the sequence.
    pub(crate) fn record(&self, id: &str, level: Option<Level>) {
        let mut entry = self
            .entries
            .entry(id.to_string())
            .or_insert(CacheEntry {
                level: None,
                seq: 0,
            });
        entry.seq += 1;
        entry.level = level;
    }

    /// Conditional write from a hydration fetch issued at `issued_seq`.
    ///
    /// Applies and returns true only if no other write landed since the
    /// fetch was issued; otherwise the stale result is rejected.
    pub(crate) fn record_if_unchanged(
        &self,
        id: &str,
        level: Option<Level>,
        issued_seq: u64,
    ) -> bool {
        let mut entry = self
            .entries
            .entry(id.to_string())
            .or_insert(CacheEntry {
                level: None,
                seq: 0,
            });
        if entry.seq != issued_seq {
            return false;
        }
        entry.seq += 1;
        entry.level = level;
        true
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&self) {
        self.entries.clear();
    }
}
