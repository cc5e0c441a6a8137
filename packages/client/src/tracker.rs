use std::collections::BTreeSet;

use dashmap::DashSet;

/// Ids of submissions still waiting for a verdict.
///
/// Holds membership only. Both mutators are idempotent and synchronous, so
/// completions of concurrent status queries can call them in any order.
#[derive(Debug, Default)]
pub struct SubmissionTracker {
    ids: DashSet<i64>,
}

impl SubmissionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking an id. Returns false if it was already tracked.
    pub fn add(&self, id: i64) -> bool {
        self.ids.insert(id)
    }

    /// Stop tracking an id. Returns false if it was not tracked.
    pub fn remove(&self, id: i64) -> bool {
        self.ids.remove(&id).is_some()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    /// Detached copy of the tracked ids, safe to iterate while the set changes.
    pub fn snapshot(&self) -> BTreeSet<i64> {
        self.ids.iter().map(|id| *id).collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&self) {
        self.ids.clear();
    }
}
