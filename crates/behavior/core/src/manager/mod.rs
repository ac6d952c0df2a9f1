//! Registry of behaviour instances and the entry points the host calls.
//!
//! The manager owns every [`BehaviorInstance`], the deferred queue and the
//! engine RNG. Hosts drive it either with [`BehaviorManager::advance`] once per
//! logical tick, or by calling [`BehaviorManager::tick_all`],
//! [`BehaviorManager::run_deferred`] and [`BehaviorManager::sweep`] on their
//! own cadence. Lifecycle notifications (`dispatch_*`) may arrive at any time
//! between ticks.
//!
//! Every call into instance logic is guarded: an `Err` or a panic is logged,
//! counted and reported as a [`BehaviorEvent::Fault`], and the remaining
//! instances carry on.

mod metrics;

pub use metrics::{ManagerMetrics, ManagerStats, MetricsSnapshot};

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, error, trace, warn};

use crate::config::EngineConfig;
use crate::deferred::{DeferredAction, DeferredQueue};
use crate::descriptor::DescriptorTable;
use crate::env::{CreatureSnapshot, World};
use crate::error::{BehaviorResult, EngineError};
use crate::events::{BehaviorEvent, RemovalReason};
use crate::instance::{BehaviorInstance, TickContext};
use crate::types::{CreatureId, EntityRef, Location, PlayerId, Tick};
use crate::variant::Variant;
use crate::variants::EncounterSummary;

/// Outcome of one behaviour pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Instances whose tick ran.
    pub ticked: usize,
    /// Instances removed because their creature was no longer valid.
    pub removed: usize,
    /// Ticks that faulted.
    pub faults: usize,
}

/// What [`BehaviorManager::advance`] did on one logical tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdvanceReport {
    pub deferred: usize,
    pub pass: Option<PassReport>,
    pub swept: Option<usize>,
}

pub struct BehaviorManager {
    descriptors: DescriptorTable,
    config: EngineConfig,
    instances: BTreeMap<CreatureId, BehaviorInstance>,
    deferred: DeferredQueue,
    events: Vec<BehaviorEvent>,
    rng: Box<dyn RngCore + Send>,
    metrics: Arc<ManagerMetrics>,
    passes: u64,
}

impl BehaviorManager {
    pub fn new(descriptors: DescriptorTable, config: EngineConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            descriptors,
            config,
            instances: BTreeMap::new(),
            deferred: DeferredQueue::new(),
            events: Vec::new(),
            rng: Box::new(rng),
            metrics: Arc::new(ManagerMetrics::new()),
            passes: 0,
        }
    }

    /// Replaces the engine RNG.
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn descriptors(&self) -> &DescriptorTable {
        &self.descriptors
    }

    /// Creates the behaviour for a freshly spawned creature.
    ///
    /// An unrecognised variant is a content error: debug builds panic, release
    /// builds log it and leave the creature without behaviour. Registering an
    /// id twice keeps the existing instance.
    pub fn register(
        &mut self,
        id: CreatureId,
        variant: Variant,
        level: u32,
        anchor: Location,
    ) -> Option<&BehaviorInstance> {
        let Some(descriptor) = self.descriptors.resolve(variant) else {
            error!(
                target: "behavior::manager",
                creature = %id,
                %variant,
                "unrecognised variant, creature left without behaviour"
            );
            debug_assert!(false, "unrecognised variant {variant} for creature {id}");
            return None;
        };

        if self.instances.contains_key(&id) {
            warn!(target: "behavior::manager", creature = %id, "creature registered twice");
            return self.instances.get(&id);
        }

        let instance = BehaviorInstance::new(id, variant, level, descriptor, anchor);
        self.instances.insert(id, instance);
        self.metrics.record_created();
        self.events.push(BehaviorEvent::Registered {
            creature: id,
            variant,
            level,
        });
        debug!(target: "behavior::manager", creature = %id, %variant, level, "registered");
        self.instances.get(&id)
    }

    /// One behaviour pass over every registered instance.
    ///
    /// Ids are snapshotted first, so registrations and removals made by the
    /// pass itself do not disturb iteration. Instances whose creature is no
    /// longer valid are removed instead of ticked.
    pub fn tick_all(&mut self, now: Tick, world: &mut dyn World) -> PassReport {
        self.passes += 1;
        self.metrics.record_pass();
        let spread = self.config.effective_spread();
        let bucket = self.passes % spread;

        let ids: Vec<CreatureId> = self.instances.keys().copied().collect();
        let mut report = PassReport::default();

        for (index, id) in ids.into_iter().enumerate() {
            let Some(me) = world.creature(id).filter(|c| c.alive) else {
                if self.evict(now, world, id, RemovalReason::Invalid) {
                    report.removed += 1;
                }
                continue;
            };
            if index as u64 % spread != bucket {
                continue;
            }
            if !self.instances.contains_key(&id) {
                continue;
            }
            match self.guarded(now, world, id, me, "tick", |instance, ctx| instance.tick(ctx)) {
                Some(()) => report.ticked += 1,
                None => report.faults += 1,
            }
        }

        trace!(
            target: "behavior::manager",
            pass = self.passes,
            ticked = report.ticked,
            removed = report.removed,
            faults = report.faults,
            "behaviour pass"
        );
        report
    }

    /// The creature landed a melee hit on `victim`. Unknown ids are ignored.
    pub fn dispatch_attack(
        &mut self,
        now: Tick,
        world: &mut dyn World,
        id: CreatureId,
        victim: PlayerId,
    ) {
        let Some(me) = self.snapshot_for_dispatch(world, id) else {
            return;
        };
        self.guarded(now, world, id, me, "on_attack", |instance, ctx| {
            instance.on_attack(ctx, victim)
        });
    }

    /// The creature took damage. Unknown ids are ignored.
    pub fn dispatch_damaged(
        &mut self,
        now: Tick,
        world: &mut dyn World,
        id: CreatureId,
        attacker: Option<EntityRef>,
        amount: f32,
    ) {
        let Some(me) = self.snapshot_for_dispatch(world, id) else {
            return;
        };
        self.guarded(now, world, id, me, "on_damaged", |instance, ctx| {
            instance.on_damaged(ctx, attacker, amount)
        });
    }

    /// The creature died. Runs death effects and teardown, then removes the
    /// instance. Unknown ids are ignored.
    pub fn dispatch_death(
        &mut self,
        now: Tick,
        world: &mut dyn World,
        id: CreatureId,
        killer: Option<PlayerId>,
    ) {
        let Some(instance) = self.instances.get(&id) else {
            return;
        };
        let me = world
            .creature(id)
            .unwrap_or_else(|| instance.last_known_snapshot());
        self.guarded(now, world, id, me, "on_death", |instance, ctx| {
            instance.on_death(ctx, killer)
        });
        if self.instances.remove(&id).is_some() {
            self.record_removal(id, RemovalReason::Died);
        }
    }

    /// Force-stops an instance: teardown without death effects. Returns
    /// whether the id was registered.
    pub fn remove(&mut self, now: Tick, world: &mut dyn World, id: CreatureId) -> bool {
        self.evict(now, world, id, RemovalReason::ForceStopped)
    }

    /// Removes every instance whose creature is no longer valid.
    pub fn sweep(&mut self, now: Tick, world: &mut dyn World) -> usize {
        let stale: Vec<CreatureId> = self
            .instances
            .keys()
            .copied()
            .filter(|&id| !world.is_creature_valid(id))
            .collect();
        let mut removed = 0;
        for id in stale {
            if self.evict(now, world, id, RemovalReason::Swept) {
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(target: "behavior::manager", removed, "sweep removed stale instances");
        }
        removed
    }

    /// Resolves every deferred action due at `now`, in schedule order.
    pub fn run_deferred(&mut self, now: Tick, world: &mut dyn World) -> usize {
        let mut resolved = 0;
        while let Some(entry) = self.deferred.pop_due(now) {
            let owner = entry.owner;
            let name = entry.action.name();
            let me = self
                .instances
                .contains_key(&owner)
                .then(|| world.creature(owner))
                .flatten()
                .filter(|c| c.alive);
            let Some(me) = me else {
                trace!(target: "behavior::deferred", creature = %owner, action = name, "owner gone, dropped");
                self.metrics.record_deferred(false);
                continue;
            };

            let action = entry.action;
            let outcome = self.guarded(now, world, owner, me, name, |instance, ctx| {
                instance.resolve(ctx, action)
            });
            let performed = outcome.unwrap_or(false);
            if !performed {
                trace!(target: "behavior::deferred", creature = %owner, action = name, "target gone, dropped");
            }
            self.metrics.record_deferred(performed);
            resolved += 1;
        }
        resolved
    }

    /// Runs one logical tick: due deferred work every tick, a behaviour pass
    /// every `behavior_interval` ticks, a sweep every `sweep_interval` ticks.
    pub fn advance(&mut self, now: Tick, world: &mut dyn World) -> AdvanceReport {
        let deferred = self.run_deferred(now, world);
        let pass = now
            .is_multiple_of(self.config.behavior_interval)
            .then(|| self.tick_all(now, world));
        let swept = now
            .is_multiple_of(self.config.sweep_interval)
            .then(|| self.sweep(now, world));
        AdvanceReport {
            deferred,
            pass,
            swept,
        }
    }

    /// Schedules follow-up work for `owner`, `delay` ticks after `now`.
    pub fn schedule(
        &mut self,
        now: Tick,
        owner: CreatureId,
        delay: u64,
        action: DeferredAction,
    ) -> Tick {
        self.deferred.schedule(now, delay, owner, action)
    }

    pub fn pending_deferred(&self) -> usize {
        self.deferred.len()
    }

    pub fn get(&self, id: CreatureId) -> Option<&BehaviorInstance> {
        self.instances.get(&id)
    }

    pub fn contains(&self, id: CreatureId) -> bool {
        self.instances.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = CreatureId> + '_ {
        self.instances.keys().copied()
    }

    /// Active boss encounters.
    pub fn encounters(&self) -> Vec<EncounterSummary> {
        self.instances
            .values()
            .filter_map(BehaviorInstance::encounter)
            .collect()
    }

    pub fn stats(&self) -> ManagerStats {
        self.metrics.stats()
    }

    /// Shared handle to the live counters.
    pub fn metrics(&self) -> Arc<ManagerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Takes every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<BehaviorEvent> {
        std::mem::take(&mut self.events)
    }

    fn snapshot_for_dispatch(&self, world: &dyn World, id: CreatureId) -> Option<CreatureSnapshot> {
        if !self.instances.contains_key(&id) {
            return None;
        }
        world.creature(id)
    }

    /// Removes an instance after running its teardown.
    fn evict(&mut self, now: Tick, world: &mut dyn World, id: CreatureId, reason: RemovalReason) -> bool {
        let Some(instance) = self.instances.get(&id) else {
            return false;
        };
        let me = instance.last_known_snapshot();
        self.guarded(now, world, id, me, "teardown", |instance, ctx| {
            instance.teardown(ctx);
            Ok(())
        });
        if self.instances.remove(&id).is_none() {
            return false;
        }
        self.record_removal(id, reason);
        true
    }

    fn record_removal(&mut self, id: CreatureId, reason: RemovalReason) {
        self.metrics.record_removed();
        self.events.push(BehaviorEvent::Removed {
            creature: id,
            reason,
        });
        debug!(target: "behavior::manager", creature = %id, %reason, "removed");
    }

    /// Runs `op` against one instance with error and panic containment.
    /// Returns `None` when the instance is missing or the call faulted.
    fn guarded<T>(
        &mut self,
        now: Tick,
        world: &mut dyn World,
        id: CreatureId,
        me: CreatureSnapshot,
        op: &'static str,
        f: impl FnOnce(&mut BehaviorInstance, &mut TickContext<'_>) -> BehaviorResult<T>,
    ) -> Option<T> {
        let Self {
            instances,
            deferred,
            events,
            rng,
            config,
            metrics,
            ..
        } = self;
        let instance = instances.get_mut(&id)?;

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let mut ctx = TickContext::new(now, me, world, rng.as_mut(), config, deferred, events);
            f(instance, &mut ctx)
        }));

        let (code, message) = match outcome {
            Ok(Ok(value)) => return Some(value),
            Ok(Err(err)) => {
                error!(
                    target: "behavior::manager",
                    creature = %id,
                    op,
                    code = err.error_code(),
                    severity = err.severity().as_str(),
                    error = %err,
                    "behaviour fault contained"
                );
                (err.error_code().to_string(), err.to_string())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(
                    target: "behavior::manager",
                    creature = %id,
                    op,
                    panic = %message,
                    "behaviour panic contained"
                );
                ("BEHAVIOR_PANIC".to_string(), message)
            }
        };
        metrics.record_fault();
        events.push(BehaviorEvent::Fault {
            creature: id,
            code,
            message,
        });
        None
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::mock::StepRng;

    use super::*;
    use crate::mock::MockWorld;
    use crate::variant::VariantKind;

    fn spread_manager(spread: u32) -> BehaviorManager {
        let config = EngineConfig::new().with_tick_spread(spread);
        BehaviorManager::new(DescriptorTable::standard(), config).with_rng(StepRng::new(0, 0))
    }

    #[test]
    fn spread_splits_instances_across_passes() {
        let mut manager = spread_manager(3);
        let mut world = MockWorld::new();
        let mut ids = Vec::new();
        for x in 0..6 {
            let at = Location::new(f64::from(x) * 50.0, 64.0, 0.0);
            let id = world.add_creature(Variant::of(VariantKind::Walker), at);
            manager.register(id, Variant::of(VariantKind::Walker), 1, at);
            ids.push(id);
        }

        for pass in 1..=3 {
            let report = manager.tick_all(Tick(pass * 5), &mut world);
            assert_eq!(report.ticked, 2);
        }
        for id in ids {
            assert_eq!(manager.get(id).map(|i| i.core().ticks), Some(1));
        }
    }

    #[test]
    fn registered_event_and_counters() {
        let mut manager = spread_manager(1);
        let id = CreatureId(4);
        manager.register(id, Variant::of(VariantKind::RabidWolf), 3, Location::default());

        assert_eq!(
            manager.drain_events(),
            vec![BehaviorEvent::Registered {
                creature: id,
                variant: Variant::of(VariantKind::RabidWolf),
                level: 3,
            }]
        );
        assert!(manager.drain_events().is_empty());
        assert_eq!(manager.stats().to_string(), "Active: 1 | Created: 1 | Removed: 0");
    }

    #[test]
    fn panic_payloads_become_messages() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
