//! Per-call context handed to variant logic.

use rand::{Rng, RngCore};

use crate::config::EngineConfig;
use crate::deferred::{DeferredAction, DeferredQueue};
use crate::env::{CreatureSnapshot, FxKind, World};
use crate::events::BehaviorEvent;
use crate::primitives;
use crate::types::{CreatureId, Location, Tick};

/// Everything a decision may touch during one tick, deferred resolution or
/// notification.
///
/// `me` is the acting creature as the world reported it when the call
/// started. Effect requests go straight to `world`; follow-up work goes into
/// the shared deferred queue under the acting creature's id.
pub struct TickContext<'a> {
    pub now: Tick,
    pub me: CreatureSnapshot,
    pub world: &'a mut dyn World,
    pub rng: &'a mut dyn RngCore,
    pub config: &'a EngineConfig,
    deferred: &'a mut DeferredQueue,
    events: &'a mut Vec<BehaviorEvent>,
}

impl<'a> TickContext<'a> {
    pub fn new(
        now: Tick,
        me: CreatureSnapshot,
        world: &'a mut dyn World,
        rng: &'a mut dyn RngCore,
        config: &'a EngineConfig,
        deferred: &'a mut DeferredQueue,
        events: &'a mut Vec<BehaviorEvent>,
    ) -> Self {
        Self {
            now,
            me,
            world,
            rng,
            config,
            deferred,
            events,
        }
    }

    pub fn id(&self) -> CreatureId {
        self.me.id
    }

    pub fn position(&self) -> Location {
        self.me.position
    }

    /// Schedules follow-up work owned by the acting creature.
    pub fn schedule(&mut self, delay: u64, action: DeferredAction) -> Tick {
        self.deferred.schedule(self.now, delay, self.me.id, action)
    }

    pub fn emit(&mut self, event: BehaviorEvent) {
        self.events.push(event);
    }

    pub fn roll(&mut self, p: f32) -> bool {
        primitives::roll(&mut *self.rng, p)
    }

    /// Uniform draw in `[low, high)`; `low` when the range is empty.
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..high)
    }

    /// Plays an effect at the acting creature's position.
    pub fn fx(&mut self, kind: FxKind) {
        let at = self.me.position;
        self.world.play_effect(kind, at);
    }

    /// Rejection-samples a standing position between `min` and `max` blocks
    /// from `origin` on the horizontal plane. Tries at most
    /// [`EngineConfig::spawn_attempts`] candidates.
    pub fn find_ground_near(&mut self, origin: Location, min: f64, max: f64) -> Option<Location> {
        let depth = self.config.ground_search_depth;
        for _ in 0..self.config.spawn_attempts {
            let angle = self.uniform(0.0, std::f64::consts::TAU);
            let distance = self.uniform(min, max);
            let candidate = origin.horizontal_offset(angle, distance);
            if let Some(ground) = self.world.ground_location(candidate, depth) {
                return Some(ground);
            }
        }
        None
    }
}
