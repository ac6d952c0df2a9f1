//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up command/event channels,
//! and exposes a builder-based API for hosts to drive the behaviour engine.

use std::sync::Arc;
use std::time::Duration;

use rand::RngCore;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::info;

use behavior_core::{BehaviorManager, DescriptorTable, EngineConfig, World};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::{Event, EventBus, Topic};
use crate::workers::{Command, SimulationWorker, TickMetrics};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub engine: EngineConfig,
    /// Wall-clock length of one logical tick
    pub tick_duration: Duration,
    pub command_buffer_size: usize,
    /// Per-topic broadcast capacity
    pub event_buffer_size: usize,
}

impl RuntimeConfig {
    pub const DEFAULT_TICK_DURATION: Duration =
        Duration::from_millis(1000 / EngineConfig::TICKS_PER_SECOND);
    pub const DEFAULT_COMMAND_BUFFER_SIZE: usize = 64;
    pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 256;
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            tick_duration: Self::DEFAULT_TICK_DURATION,
            command_buffer_size: Self::DEFAULT_COMMAND_BUFFER_SIZE,
            event_buffer_size: Self::DEFAULT_EVENT_BUFFER_SIZE,
        }
    }
}

/// Main runtime that drives the behaviour engine on a fixed tick.
///
/// [`RuntimeHandle`] provides a cloneable façade for hosts.
pub struct Runtime {
    handle: RuntimeHandle,
    sim_worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Subscribe to behaviour events on one topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Shutdown the runtime gracefully
    ///
    /// Outstanding handle clones start failing with
    /// [`RuntimeError::CommandChannelClosed`] once the worker has stopped.
    pub async fn shutdown(self) -> Result<()> {
        // The worker may already be gone; joining below reports why.
        let _ = self.handle.request_shutdown().await;
        drop(self.handle);

        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        info!(target: "runtime", "runtime shut down");
        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    descriptors: Option<DescriptorTable>,
    world: Option<Box<dyn World + Send>>,
    rng: Option<Box<dyn RngCore + Send>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            descriptors: None,
            world: None,
            rng: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Descriptor table (defaults to the standard table)
    pub fn descriptors(mut self, descriptors: DescriptorTable) -> Self {
        self.descriptors = Some(descriptors);
        self
    }

    /// Set the required host world
    pub fn world(mut self, world: impl World + Send + 'static) -> Self {
        self.world = Some(Box::new(world));
        self
    }

    /// Override the random source, taking precedence over `rng_seed`
    pub fn rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    /// Build the runtime and spawn its worker
    pub async fn build(self) -> Result<Runtime> {
        let world = self.world.ok_or(RuntimeError::MissingWorld)?;
        let descriptors = self.descriptors.unwrap_or_else(DescriptorTable::standard);

        let mut manager = BehaviorManager::new(descriptors, self.config.engine.clone());
        if let Some(rng) = self.rng {
            manager = manager.with_rng(rng);
        }

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let tick_metrics = Arc::new(TickMetrics::new());

        let handle = RuntimeHandle::new(
            command_tx,
            event_bus.clone(),
            manager.metrics(),
            Arc::clone(&tick_metrics),
        );

        let sim_worker = SimulationWorker::new(
            manager,
            world,
            self.config.tick_duration,
            command_rx,
            event_bus,
            tick_metrics,
        );

        let sim_worker_handle = tokio::spawn(async move {
            sim_worker.run().await;
        });

        Ok(Runtime {
            handle,
            sim_worker_handle,
        })
    }
}
