//! Async runtime for the creature behaviour engine.
//!
//! [`behavior_core`] is synchronous and clock-agnostic. This crate gives it a
//! home: a worker task owns the [`BehaviorManager`](behavior_core::BehaviorManager)
//! and the host world, advances the logical clock on a fixed interval, and
//! applies spawn, combat and death notifications between ticks. Hosts embed
//! [`Runtime`] and talk to it through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod runtime;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use events::{BehaviorRecord, Event, EventBus, Topic};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use workers::{TickMetrics, TickMetricsSnapshot};
