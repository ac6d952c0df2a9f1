//! Worker tasks that back the runtime orchestration.
//!
//! The simulation worker owns the behaviour manager and the world, advances
//! logical time on a fixed interval and serves commands in between.

mod metrics;
mod simulation;

pub use metrics::{TickMetrics, TickMetricsSnapshot};
pub use simulation::{Command, SimulationWorker};
