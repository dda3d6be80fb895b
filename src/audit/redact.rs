//! Field redaction
//!
//! Strips excluded fields from a snapshot before it is diffed, so sensitive or
//! noisy attributes never reach the audit store.

use std::collections::BTreeSet;

use crate::dispatch::TrackedEntityType;
use crate::models::Snapshot;

/// Removes globally and per-type excluded fields from snapshots
#[derive(Debug, Clone, Default)]
pub struct Redactor {
    global: BTreeSet<String>,
}

impl Redactor {
    pub fn new(global: BTreeSet<String>) -> Self {
        Self { global }
    }

    /// Drop every field named in the global or the entity type's exclusion set
    ///
    /// Removed keys disappear entirely rather than being nulled.
    pub fn filter(&self, tracked: &TrackedEntityType, mut snapshot: Snapshot) -> Snapshot {
        if self.global.is_empty() && tracked.discards.is_empty() {
            return snapshot;
        }

        snapshot.retain(|field| !self.is_excluded(tracked, field));
        snapshot
    }

    fn is_excluded(&self, tracked: &TrackedEntityType, field: &str) -> bool {
        self.global.contains(field) || tracked.discards.contains(field)
    }
}
