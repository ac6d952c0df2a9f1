//! Registry counters.
//!
//! Counters live behind atomics so a host can share them (through an `Arc`)
//! with monitoring code running on other threads while the manager keeps
//! exclusive ownership of the registry itself.

use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lifetime counters of a [`super::BehaviorManager`].
#[derive(Debug, Default)]
pub struct ManagerMetrics {
    /// Instances ever registered
    created: AtomicU64,

    /// Instances ever removed, for any reason
    removed: AtomicU64,

    /// Instances currently registered
    active: AtomicU64,

    /// Decision faults contained (errors and panics)
    faults: AtomicU64,

    /// Behaviour passes run
    passes: AtomicU64,

    /// Deferred actions resolved
    deferred_resolved: AtomicU64,

    /// Deferred actions dropped because the owner or target went away
    deferred_dropped: AtomicU64,
}

impl ManagerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_created(&self) {
        self.created.fetch_add(1, Ordering::Relaxed);
        self.active.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_removed(&self) {
        self.removed.fetch_add(1, Ordering::Relaxed);
        // Saturating: never wrap below zero even if calls are unbalanced.
        let _ = self
            .active
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| Some(v.saturating_sub(1)));
    }

    pub fn record_fault(&self) {
        self.faults.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pass(&self) {
        self.passes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_deferred(&self, resolved: bool) {
        if resolved {
            self.deferred_resolved.fetch_add(1, Ordering::Relaxed);
        } else {
            self.deferred_dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }

    pub fn removed(&self) -> u64 {
        self.removed.load(Ordering::Relaxed)
    }

    pub fn active(&self) -> u64 {
        self.active.load(Ordering::Relaxed)
    }

    pub fn faults(&self) -> u64 {
        self.faults.load(Ordering::Relaxed)
    }

    pub fn passes(&self) -> u64 {
        self.passes.load(Ordering::Relaxed)
    }

    /// The three headline numbers.
    pub fn stats(&self) -> ManagerStats {
        ManagerStats {
            active: self.active(),
            created: self.created(),
            removed: self.removed(),
        }
    }

    /// Snapshot of every counter.
    ///
    /// Fields are read one by one; the snapshot as a whole may straddle a
    /// concurrent update.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            created: self.created(),
            removed: self.removed(),
            active: self.active(),
            faults: self.faults(),
            passes: self.passes(),
            deferred_resolved: self.deferred_resolved.load(Ordering::Relaxed),
            deferred_dropped: self.deferred_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Headline registry statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ManagerStats {
    pub active: u64,
    pub created: u64,
    pub removed: u64,
}

impl fmt::Display for ManagerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Active: {} | Created: {} | Removed: {}",
            self.active, self.created, self.removed
        )
    }
}

/// Every counter at a point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricsSnapshot {
    pub created: u64,
    pub removed: u64,
    pub active: u64,
    pub faults: u64,
    pub passes: u64,
    pub deferred_resolved: u64,
    pub deferred_dropped: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_display() {
        let metrics = ManagerMetrics::new();
        metrics.record_created();
        metrics.record_created();
        metrics.record_removed();
        assert_eq!(metrics.stats().to_string(), "Active: 1 | Created: 2 | Removed: 1");
    }

    #[test]
    fn active_never_underflows() {
        let metrics = ManagerMetrics::new();
        metrics.record_removed();
        assert_eq!(metrics.active(), 0);
        assert_eq!(metrics.removed(), 1);
    }

    #[test]
    fn deferred_outcomes_are_split() {
        let metrics = ManagerMetrics::new();
        metrics.record_deferred(true);
        metrics.record_deferred(false);
        metrics.record_deferred(false);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.deferred_resolved, 1);
        assert_eq!(snapshot.deferred_dropped, 2);
    }
}
