//! Simulation worker timing and throughput.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Counters maintained by the simulation worker.
///
/// Uses atomics for lock-free access across threads.
#[derive(Debug, Default)]
pub struct TickMetrics {
    /// Logical ticks advanced
    ticks: AtomicU64,

    /// Commands handled between ticks
    commands: AtomicU64,

    /// Ticks whose processing took longer than the tick duration
    overruns: AtomicU64,

    /// Total time spent advancing ticks, in nanoseconds
    total_tick_nanos: AtomicU64,

    /// Slowest tick observed, in nanoseconds
    peak_tick_nanos: AtomicU64,
}

impl TickMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one advanced tick and how long it took.
    pub fn record_tick(&self, elapsed: Duration, budget: Duration) {
        let nanos = elapsed.as_nanos() as u64;
        self.ticks.fetch_add(1, Ordering::Relaxed);
        self.total_tick_nanos.fetch_add(nanos, Ordering::Relaxed);
        if elapsed > budget {
            self.overruns.fetch_add(1, Ordering::Relaxed);
        }

        let mut current_peak = self.peak_tick_nanos.load(Ordering::Relaxed);
        while nanos > current_peak {
            match self.peak_tick_nanos.compare_exchange_weak(
                current_peak,
                nanos,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => current_peak = actual,
            }
        }
    }

    pub fn record_command(&self) {
        self.commands.fetch_add(1, Ordering::Relaxed);
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn commands(&self) -> u64 {
        self.commands.load(Ordering::Relaxed)
    }

    pub fn overruns(&self) -> u64 {
        self.overruns.load(Ordering::Relaxed)
    }

    pub fn avg_tick_time(&self) -> Duration {
        let ticks = self.ticks();
        if ticks == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(self.total_tick_nanos.load(Ordering::Relaxed) / ticks)
        }
    }

    pub fn peak_tick_time(&self) -> Duration {
        Duration::from_nanos(self.peak_tick_nanos.load(Ordering::Relaxed))
    }

    /// Not atomic across fields.
    pub fn snapshot(&self) -> TickMetricsSnapshot {
        TickMetricsSnapshot {
            ticks: self.ticks(),
            commands: self.commands(),
            overruns: self.overruns(),
            avg_tick_time: self.avg_tick_time(),
            peak_tick_time: self.peak_tick_time(),
        }
    }
}

/// Snapshot of worker metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickMetricsSnapshot {
    pub ticks: u64,
    pub commands: u64,
    pub overruns: u64,
    pub avg_tick_time: Duration,
    pub peak_tick_time: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_peak_and_overruns() {
        let metrics = TickMetrics::new();
        let budget = Duration::from_millis(50);
        metrics.record_tick(Duration::from_millis(10), budget);
        metrics.record_tick(Duration::from_millis(70), budget);
        metrics.record_tick(Duration::from_millis(30), budget);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.ticks, 3);
        assert_eq!(snapshot.overruns, 1);
        assert_eq!(snapshot.peak_tick_time, Duration::from_millis(70));
        assert_eq!(snapshot.avg_tick_time, Duration::from_millis(110) / 3);
    }
}
