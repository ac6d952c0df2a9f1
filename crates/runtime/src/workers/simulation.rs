//! Simulation worker that owns the [`BehaviorManager`] and the host world.
//!
//! Advances the logical clock on a fixed interval, applies notifications
//! received from [`RuntimeHandle`](crate::RuntimeHandle) between ticks, and
//! publishes every behaviour event to the EventBus.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

use behavior_core::{
    BehaviorManager, CreatureId, EncounterSummary, EntityRef, Location, PlayerId, Tick, Variant,
    World,
};

use super::metrics::TickMetrics;
use crate::api::{Result, RuntimeError};
use crate::events::{Event, EventBus};

/// Commands that can be sent to the simulation worker
pub enum Command {
    /// A creature spawned and needs behaviour.
    Spawned {
        creature: CreatureId,
        variant: Variant,
        level: u32,
        anchor: Location,
        reply: oneshot::Sender<Result<()>>,
    },
    AttackLanded {
        creature: CreatureId,
        victim: PlayerId,
    },
    Damaged {
        creature: CreatureId,
        attacker: Option<EntityRef>,
        amount: f32,
    },
    Died {
        creature: CreatureId,
        killer: Option<PlayerId>,
    },
    /// Stop a creature's behaviour without death effects.
    ForceStop {
        creature: CreatureId,
        reply: oneshot::Sender<bool>,
    },
    Encounters {
        reply: oneshot::Sender<Vec<EncounterSummary>>,
    },
    CurrentTick {
        reply: oneshot::Sender<Tick>,
    },
    /// Stop the worker loop even while handles are still alive.
    Shutdown,
}

/// Background task driving the behaviour engine.
pub struct SimulationWorker {
    manager: BehaviorManager,
    world: Box<dyn World + Send>,
    now: Tick,
    tick_duration: Duration,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    metrics: Arc<TickMetrics>,
}

impl SimulationWorker {
    pub fn new(
        manager: BehaviorManager,
        world: Box<dyn World + Send>,
        tick_duration: Duration,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
        metrics: Arc<TickMetrics>,
    ) -> Self {
        info!(
            target: "runtime::worker",
            descriptors = manager.descriptors().len(),
            tick_ms = tick_duration.as_millis() as u64,
            "SimulationWorker initialized"
        );

        Self {
            manager,
            world,
            now: Tick::ZERO,
            tick_duration,
            command_rx,
            event_bus,
            metrics,
        }
    }

    /// Main worker loop.
    ///
    /// Ends when a `Shutdown` command arrives or every handle is dropped.
    pub async fn run(mut self) {
        let mut interval = tokio::time::interval(self.tick_duration);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(Command::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },
                _ = interval.tick() => self.advance(),
            }
        }

        // Flush whatever the final commands produced.
        self.publish_events();
        info!(
            target: "runtime::worker",
            tick = %self.now,
            active = self.manager.len(),
            "SimulationWorker stopped"
        );
    }

    fn handle_command(&mut self, cmd: Command) {
        self.metrics.record_command();
        let world = self.world.as_mut();

        match cmd {
            Command::Spawned {
                creature,
                variant,
                level,
                anchor,
                reply,
            } => {
                let result = if self.manager.descriptors().resolve(variant).is_none() {
                    warn!(
                        target: "runtime::worker",
                        creature = %creature,
                        %variant,
                        "rejecting spawn with unrecognised variant"
                    );
                    Err(RuntimeError::UnrecognisedVariant(variant))
                } else {
                    self.manager.register(creature, variant, level, anchor);
                    Ok(())
                };
                if reply.send(result).is_err() {
                    debug!(target: "runtime::worker", "Spawned reply channel closed (caller dropped)");
                }
            }
            Command::AttackLanded { creature, victim } => {
                self.manager
                    .dispatch_attack(self.now, world, creature, victim);
            }
            Command::Damaged {
                creature,
                attacker,
                amount,
            } => {
                self.manager
                    .dispatch_damaged(self.now, world, creature, attacker, amount);
            }
            Command::Died { creature, killer } => {
                self.manager.dispatch_death(self.now, world, creature, killer);
            }
            Command::ForceStop { creature, reply } => {
                let removed = self.manager.remove(self.now, world, creature);
                if reply.send(removed).is_err() {
                    debug!(target: "runtime::worker", "ForceStop reply channel closed (caller dropped)");
                }
            }
            Command::Encounters { reply } => {
                if reply.send(self.manager.encounters()).is_err() {
                    debug!(target: "runtime::worker", "Encounters reply channel closed (caller dropped)");
                }
            }
            Command::CurrentTick { reply } => {
                if reply.send(self.now).is_err() {
                    debug!(target: "runtime::worker", "CurrentTick reply channel closed (caller dropped)");
                }
            }
            Command::Shutdown => {}
        }

        self.publish_events();
    }

    /// Advances the logical clock by one tick.
    fn advance(&mut self) {
        self.now = self.now + 1;
        let started = Instant::now();
        let report = self.manager.advance(self.now, self.world.as_mut());
        let elapsed = started.elapsed();
        self.metrics.record_tick(elapsed, self.tick_duration);

        if elapsed > self.tick_duration {
            warn!(
                target: "runtime::worker",
                tick = %self.now,
                elapsed_us = elapsed.as_micros() as u64,
                "tick overran its budget"
            );
        }
        if let Some(pass) = report.pass {
            trace!(
                target: "runtime::worker",
                tick = %self.now,
                ticked = pass.ticked,
                removed = pass.removed,
                faults = pass.faults,
                deferred = report.deferred,
                "behaviour pass"
            );
        }

        self.publish_events();
    }

    fn publish_events(&mut self) {
        for event in self.manager.drain_events() {
            self.event_bus.publish(Event::from_behavior(self.now, event));
        }
    }
}
