//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing. Combat notifications are
//! fire-and-forget once queued; queries wait for the worker's reply.
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};

use behavior_core::{
    CreatureId, EncounterSummary, EntityRef, Location, ManagerMetrics, ManagerStats,
    MetricsSnapshot, PlayerId, Tick, Variant,
};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::{Command, TickMetrics, TickMetricsSnapshot};

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
    manager_metrics: Arc<ManagerMetrics>,
    tick_metrics: Arc<TickMetrics>,
}

impl RuntimeHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        event_bus: EventBus,
        manager_metrics: Arc<ManagerMetrics>,
        tick_metrics: Arc<TickMetrics>,
    ) -> Self {
        Self {
            command_tx,
            event_bus,
            manager_metrics,
            tick_metrics,
        }
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    /// Registers behaviour for a freshly spawned creature.
    ///
    /// Fails with [`RuntimeError::UnrecognisedVariant`] when no descriptor
    /// matches; the creature then simply has no behaviour.
    pub async fn creature_spawned(
        &self,
        creature: CreatureId,
        variant: Variant,
        level: u32,
        anchor: Location,
    ) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.send(Command::Spawned {
            creature,
            variant,
            level,
            anchor,
            reply: reply_tx,
        })
        .await?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// The creature landed a melee hit on `victim`.
    pub async fn attack_landed(&self, creature: CreatureId, victim: PlayerId) -> Result<()> {
        self.send(Command::AttackLanded { creature, victim }).await
    }

    pub async fn creature_damaged(
        &self,
        creature: CreatureId,
        attacker: Option<EntityRef>,
        amount: f32,
    ) -> Result<()> {
        self.send(Command::Damaged {
            creature,
            attacker,
            amount,
        })
        .await
    }

    pub async fn creature_died(&self, creature: CreatureId, killer: Option<PlayerId>) -> Result<()> {
        self.send(Command::Died { creature, killer }).await
    }

    /// Stops a creature's behaviour without death effects. Returns whether it
    /// was registered.
    pub async fn force_stop(&self, creature: CreatureId) -> Result<bool> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.send(Command::ForceStop {
            creature,
            reply: reply_tx,
        })
        .await?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Active boss encounters.
    pub async fn encounters(&self) -> Result<Vec<EncounterSummary>> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.send(Command::Encounters { reply: reply_tx }).await?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Current logical tick of the simulation.
    pub async fn current_tick(&self) -> Result<Tick> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.send(Command::CurrentTick { reply: reply_tx }).await?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Registry statistics, read without a round-trip to the worker.
    pub fn stats(&self) -> ManagerStats {
        self.manager_metrics.stats()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.manager_metrics.snapshot()
    }

    pub fn tick_metrics(&self) -> TickMetricsSnapshot {
        self.tick_metrics.snapshot()
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Lifecycle` - registrations, removals and contained faults
    /// - `Topic::Encounter` - boss phases, participants, vulnerability
    /// - `Topic::Combat` - everything else
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> std::collections::HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub(crate) async fn request_shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown).await
    }
}
