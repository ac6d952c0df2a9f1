//! Behaviour instances: one per registered creature.
//!
//! An instance is split in two halves. [`InstanceCore`] carries everything
//! every variant has (cooldowns, phase ladder, commit cycle, channel, minion
//! registry, flags) together with the shared decision helpers. The
//! variant-specific half lives in [`VariantState`] and is driven through the
//! [`VariantLogic`] trait.
mod context;

pub use context::TickContext;

use std::sync::Arc;

use bitflags::bitflags;
use tracing::{debug, trace};

use crate::deferred::{DeferredAction, Impact, ImpactSite, MinionPool};
use crate::descriptor::BehaviorDescriptor;
use crate::env::{
    Announcement, Attribute, CreatureSnapshot, FxKind, PlayerSnapshot, Radii, StatusEffect,
    StatusKind,
};
use crate::error::{BehaviorError, BehaviorResult};
use crate::events::{Ability, BehaviorEvent};
use crate::primitives::{Channel, CommitCycle, Cooldown, MinionRegistry, PhaseLadder, PhaseTransition};
use crate::types::{CreatureId, EntityRef, Location, PlayerId, Tick, Vec3};
use crate::variant::Variant;
use crate::variants::{EncounterSummary, VariantLogic, VariantState};

bitflags! {
    /// Observable behaviour state of an instance.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct BehaviorFlags: u8 {
        const ENRAGED    = 1 << 0;
        const CHANNELING = 1 << 1;
        const COMMITTING = 1 << 2;
        const VULNERABLE = 1 << 3;
    }
}

/// Multipliers applied by an enrage.
pub const ENRAGE_SPEED: f32 = 1.3;
pub const ENRAGE_DAMAGE: f32 = 1.5;

/// Search radius retained for a current target, relative to the aggro radius.
const TARGET_RETAIN_FACTOR: f64 = 1.5;

/// Variant-independent half of a behaviour instance.
#[derive(Clone, Debug)]
pub struct InstanceCore {
    pub id: CreatureId,
    pub variant: Variant,
    pub level: u32,
    pub descriptor: Arc<BehaviorDescriptor>,
    /// Spawn position; the leash anchor for variants that have one.
    pub anchor: Location,
    pub target: Option<PlayerId>,
    pub ability: Cooldown,
    pub special: Cooldown,
    pub phases: PhaseLadder,
    pub commit: CommitCycle,
    pub channel: Channel,
    pub minions: MinionRegistry,
    lockout_until: Option<Tick>,
    enraged: bool,
    spawned: bool,
    /// Behaviour passes this instance has received.
    pub ticks: u64,
    pub last_position: Location,
    pub last_health_ratio: f32,
}

impl InstanceCore {
    pub fn new(
        id: CreatureId,
        variant: Variant,
        level: u32,
        descriptor: Arc<BehaviorDescriptor>,
        anchor: Location,
    ) -> Self {
        Self {
            id,
            variant,
            level,
            ability: Cooldown::new(descriptor.ability_cooldown),
            special: Cooldown::new(descriptor.special_cooldown),
            phases: PhaseLadder::new(&descriptor.phase_thresholds),
            commit: CommitCycle::new(),
            channel: Channel::new(),
            minions: MinionRegistry::new(descriptor.max_minions),
            descriptor,
            anchor,
            target: None,
            lockout_until: None,
            enraged: false,
            spawned: false,
            ticks: 0,
            last_position: anchor,
            last_health_ratio: 1.0,
        }
    }

    pub fn flags(&self) -> BehaviorFlags {
        let mut flags = BehaviorFlags::empty();
        flags.set(BehaviorFlags::ENRAGED, self.enraged);
        flags.set(BehaviorFlags::CHANNELING, self.channel.is_active());
        flags.set(BehaviorFlags::COMMITTING, self.commit.is_committing());
        flags.set(BehaviorFlags::VULNERABLE, self.commit.is_vulnerable());
        flags
    }

    pub fn is_enraged(&self) -> bool {
        self.enraged
    }

    /// Records the latest world snapshot of this creature.
    fn observe(&mut self, me: &CreatureSnapshot) -> BehaviorResult {
        if !me.health.is_finite() || !me.max_health.is_finite() {
            return Err(BehaviorError::InvalidHealth {
                creature: self.id,
                health: me.health,
            });
        }
        self.last_position = me.position;
        self.last_health_ratio = me.health_ratio();
        Ok(())
    }

    /// Strictly below `fraction` of max health.
    pub fn health_below(&self, fraction: f32) -> bool {
        self.last_health_ratio < fraction
    }

    pub fn is_locked_out(&self, now: Tick) -> bool {
        self.lockout_until.is_some_and(|until| now < until)
    }

    /// Free to start a new ability: idle, not channeling, not locked out.
    pub fn can_act(&self, now: Tick) -> bool {
        self.commit.is_idle() && !self.channel.is_active() && !self.is_locked_out(now)
    }

    /// Keeps the current target while it stays valid and reasonably close,
    /// otherwise picks the nearest valid player within the aggro radius.
    pub fn acquire_target(&mut self, ctx: &mut TickContext<'_>) -> Option<PlayerSnapshot> {
        let origin = ctx.position();
        let radius = self.descriptor.aggro_radius;
        let retain_sq = (radius * TARGET_RETAIN_FACTOR).powi(2);

        if let Some(current) = self.target.and_then(|id| ctx.world.valid_player(id))
            && current.position.distance_squared(&origin) <= retain_sq
        {
            return Some(current);
        }

        let found = ctx.world.nearest_player(origin, radius);
        let id = found.as_ref().map(|p| p.id);
        if id != self.target {
            self.target = id;
            ctx.world.set_target(self.id, id);
        }
        found
    }

    pub fn clear_target(&mut self, ctx: &mut TickContext<'_>) {
        if self.target.take().is_some() {
            ctx.world.set_target(self.id, None);
        }
    }

    /// One-shot enrage. Returns `false` when already enraged.
    pub fn enrage(&mut self, ctx: &mut TickContext<'_>) -> bool {
        if self.enraged {
            return false;
        }
        self.enraged = true;
        ctx.world
            .scale_attribute(self.id, Attribute::MovementSpeed, ENRAGE_SPEED);
        ctx.world
            .scale_attribute(self.id, Attribute::AttackDamage, ENRAGE_DAMAGE);
        ctx.fx(FxKind::Enrage);
        ctx.emit(BehaviorEvent::Enraged { creature: self.id });
        debug!(target: "behavior::variant", creature = %self.id, "enraged");
        true
    }

    pub fn heal(&self, ctx: &mut TickContext<'_>, amount: f32) {
        if amount > 0.0 {
            ctx.world.heal(self.id, amount);
        }
    }

    pub fn heal_fraction(&self, ctx: &mut TickContext<'_>, fraction: f32) {
        let amount = ctx.me.max_health * fraction;
        self.heal(ctx, amount);
    }

    pub fn apply_self(&self, ctx: &mut TickContext<'_>, effect: StatusEffect) {
        ctx.world.apply_status(EntityRef::Creature(self.id), effect);
    }

    /// Advances the phase ladder by at most one step and applies the
    /// transition effects. `audience` receives the announcement.
    pub fn check_phase(
        &mut self,
        ctx: &mut TickContext<'_>,
        audience: &[PlayerId],
    ) -> Option<PhaseTransition> {
        let transition = self.phases.check(self.last_health_ratio)?;
        let descriptor = Arc::clone(&self.descriptor);
        let spec = &descriptor.phase_transition;

        ctx.world
            .scale_attribute(self.id, Attribute::AttackDamage, spec.damage_multiplier);
        ctx.world
            .scale_attribute(self.id, Attribute::MovementSpeed, spec.speed_multiplier);
        if spec.heal_fraction > 0.0 {
            self.heal_fraction(ctx, spec.heal_fraction);
        }
        if spec.immunity_ticks > 0 {
            self.apply_self(
                ctx,
                StatusEffect::new(StatusKind::Resistance, spec.immunity_ticks, 4),
            );
        }
        if spec.lockout_ticks > 0 {
            self.lockout_until = Some(ctx.now + spec.lockout_ticks);
        }
        ctx.fx(FxKind::PhaseShift);

        if !audience.is_empty() {
            let announcement = Announcement::new(
                self.variant.kind.display_name(),
                format!("Phase {}/{}", transition.to, self.phases.phase_count()),
            );
            ctx.world.announce(audience, &announcement);
        }

        ctx.emit(BehaviorEvent::PhaseChanged {
            creature: self.id,
            transition,
        });
        debug!(
            target: "behavior::variant",
            creature = %self.id,
            from = transition.from,
            to = transition.to,
            "phase transition"
        );
        Some(transition)
    }

    /// Starts a committed ability. `payload` is scheduled to land exactly when
    /// the commit ends, ahead of the commit-end step itself.
    pub fn begin_commit(
        &mut self,
        ctx: &mut TickContext<'_>,
        ability: Ability,
        duration: u64,
        payload: Option<DeferredAction>,
    ) -> bool {
        let Some(until) = self.commit.begin(ctx.now, duration) else {
            return false;
        };
        if let Some(payload) = payload {
            ctx.schedule(duration, payload);
        }
        ctx.schedule(duration, DeferredAction::CommitEnd);
        ctx.fx(FxKind::Telegraph);
        ctx.emit(BehaviorEvent::CommitStarted {
            creature: self.id,
            ability,
            until,
        });
        trace!(target: "behavior::variant", creature = %self.id, %ability, %until, "commit started");
        true
    }

    /// Reports an ability that takes effect without a commit.
    pub fn report_ability(&self, ctx: &mut TickContext<'_>, ability: Ability) {
        ctx.emit(BehaviorEvent::AbilityUsed {
            creature: self.id,
            ability,
        });
        trace!(target: "behavior::variant", creature = %self.id, %ability, "ability used");
    }

    /// Rolls the descriptor's counter-attack against a player attacker.
    pub fn counter_attack(&self, ctx: &mut TickContext<'_>, attacker: Option<EntityRef>) -> bool {
        let Some(player) = attacker.and_then(EntityRef::as_player) else {
            return false;
        };
        if !ctx.roll(self.descriptor.counter_chance) {
            return false;
        }
        ctx.world.damage(
            EntityRef::Player(player),
            self.descriptor.counter_damage,
            self.id,
        );
        true
    }

    /// Lunges towards `destination` with the given horizontal strength.
    pub fn leap_towards(&self, ctx: &mut TickContext<'_>, destination: Location, strength: f64) {
        let velocity = ctx
            .position()
            .direction_to(&destination)
            .with_y(0.0)
            .normalized()
            .scaled(strength)
            .with_y(0.4);
        ctx.world.knockback(EntityRef::Creature(self.id), velocity);
        ctx.fx(FxKind::Leap);
    }

    /// Pushes itself away from `threat`.
    pub fn retreat_from(&self, ctx: &mut TickContext<'_>, threat: Location, strength: f64) {
        let velocity = threat
            .direction_to(&ctx.position())
            .with_y(0.0)
            .normalized()
            .scaled(strength)
            .with_y(0.2);
        ctx.world.knockback(EntityRef::Creature(self.id), velocity);
    }

    /// Spawns up to `count` minions, limited by the registry's remaining
    /// capacity and by how many ground positions can be found.
    pub fn summon(
        &mut self,
        ctx: &mut TickContext<'_>,
        count: u8,
        level: u32,
        pool: MinionPool,
        target: Option<PlayerId>,
    ) -> Vec<CreatureId> {
        let allowed = usize::from(count).min(self.minions.remaining_capacity());
        let origin = ctx.position();
        let mut spawned = Vec::with_capacity(allowed);

        for _ in 0..allowed {
            let Some(spot) = ctx.find_ground_near(origin, 3.0, 7.0) else {
                continue;
            };
            let kind = pool.pick(&mut *ctx.rng);
            let Some(id) = ctx.world.spawn_creature(Variant::of(kind), level.max(1), spot) else {
                continue;
            };
            if self.minions.try_add(id) {
                if target.is_some() {
                    ctx.world.set_target(id, target);
                }
                spawned.push(id);
            }
        }

        if !spawned.is_empty() {
            ctx.fx(FxKind::Summon);
        }
        debug!(
            target: "behavior::variant",
            creature = %self.id,
            requested = count,
            spawned = spawned.len(),
            "minions summoned"
        );
        ctx.emit(BehaviorEvent::MinionsSummoned {
            summoner: self.id,
            requested: count,
            minions: spawned.clone(),
        });
        spawned
    }

    /// Resolves a deferred action. Returns `false` when the action was
    /// dropped because its target is no longer valid.
    pub fn resolve(&mut self, ctx: &mut TickContext<'_>, action: DeferredAction) -> BehaviorResult<bool> {
        match action {
            DeferredAction::Impact(impact) => Ok(self.strike(ctx, &impact)),
            DeferredAction::Shockwave {
                origin,
                wave,
                waves,
                interval,
                damage,
            } => {
                if waves == 0 || wave == 0 || wave > waves {
                    return Err(BehaviorError::InvalidDeferred {
                        creature: self.id,
                        action: "shockwave",
                        reason: "wave index outside 1..=waves",
                    });
                }
                let radius = 4.0 + 2.0 * f64::from(wave);
                let impact = Impact::new(ImpactSite::At(origin), radius, damage).with_knockback(0.8);
                ctx.world.play_effect(FxKind::Shockwave, origin);
                self.strike(ctx, &impact);
                if wave < waves {
                    ctx.schedule(
                        interval,
                        DeferredAction::Shockwave {
                            origin,
                            wave: wave + 1,
                            waves,
                            interval,
                            damage,
                        },
                    );
                }
                Ok(true)
            }
            DeferredAction::SummonMinions {
                count,
                level,
                pool,
                target,
            } => {
                let target = target.filter(|&id| ctx.world.valid_player(id).is_some());
                self.summon(ctx, count, level, pool, target);
                Ok(true)
            }
            DeferredAction::CommitEnd => {
                let vulnerable_for = self.descriptor.vulnerable_ticks;
                if let Some(until) = self.commit.complete(ctx.now, vulnerable_for) {
                    ctx.schedule(vulnerable_for, DeferredAction::VulnerabilityEnd);
                    self.apply_self(
                        ctx,
                        StatusEffect::new(StatusKind::Glowing, vulnerable_for, 0),
                    );
                    ctx.emit(BehaviorEvent::VulnerabilityOpened {
                        creature: self.id,
                        until,
                    });
                }
                Ok(true)
            }
            DeferredAction::VulnerabilityEnd => {
                if self.commit.recover() {
                    ctx.emit(BehaviorEvent::VulnerabilityClosed { creature: self.id });
                }
                Ok(true)
            }
        }
    }

    /// Lands `impact` now. Returns `false` when its target is no longer valid.
    pub fn strike(&self, ctx: &mut TickContext<'_>, impact: &Impact) -> bool {
        let target = match impact.target {
            Some(id) => match ctx.world.valid_player(id) {
                Some(player) => Some(player),
                None => return false,
            },
            None => None,
        };

        let center = match (impact.site, &target) {
            (ImpactSite::At(location), _) => location,
            (ImpactSite::Target, Some(player)) => player.position,
            (ImpactSite::Target, None) | (ImpactSite::Owner, _) => ctx.position(),
        };
        ctx.world.play_effect(FxKind::Impact, center);

        let radius_sq = impact.radius * impact.radius;
        let victims: Vec<PlayerSnapshot> = ctx
            .world
            .nearby_players(center, Radii::cube(impact.radius))
            .into_iter()
            .filter(|p| p.is_valid_target() && p.position.distance_squared(&center) <= radius_sq)
            .collect();

        let mut dealt = 0.0;
        for victim in &victims {
            let entity = EntityRef::Player(victim.id);
            ctx.world.damage(entity, impact.damage, self.id);
            dealt += impact.damage;
            if let Some(status) = impact.status {
                ctx.world.apply_status(entity, status);
            }
            if impact.knockback > 0.0 {
                let push: Vec3 = center
                    .direction_to(&victim.position)
                    .with_y(0.0)
                    .normalized()
                    .scaled(impact.knockback)
                    .with_y(0.3);
                ctx.world.knockback(entity, push);
            }
        }
        if impact.drain > 0.0 {
            self.heal(ctx, dealt * impact.drain);
        }
        true
    }
}

/// A registered creature's behaviour.
#[derive(Clone, Debug)]
pub struct BehaviorInstance {
    core: InstanceCore,
    state: VariantState,
}

impl BehaviorInstance {
    pub fn new(
        id: CreatureId,
        variant: Variant,
        level: u32,
        descriptor: Arc<BehaviorDescriptor>,
        anchor: Location,
    ) -> Self {
        let state = VariantState::for_descriptor(&descriptor, anchor);
        Self {
            core: InstanceCore::new(id, variant, level, descriptor, anchor),
            state,
        }
    }

    pub fn id(&self) -> CreatureId {
        self.core.id
    }

    pub fn variant(&self) -> Variant {
        self.core.variant
    }

    pub fn level(&self) -> u32 {
        self.core.level
    }

    pub fn flags(&self) -> BehaviorFlags {
        self.core.flags()
    }

    pub fn phase(&self) -> u8 {
        self.core.phases.current()
    }

    pub fn core(&self) -> &InstanceCore {
        &self.core
    }

    pub fn state(&self) -> &VariantState {
        &self.state
    }

    /// Boss encounter summary, `None` for non-boss variants.
    pub fn encounter(&self) -> Option<EncounterSummary> {
        self.state.encounter(&self.core)
    }

    fn split(&mut self) -> (&mut InstanceCore, &mut dyn VariantLogic) {
        (&mut self.core, self.state.logic_mut())
    }

    pub fn tick(&mut self, ctx: &mut TickContext<'_>) -> BehaviorResult {
        let (core, logic) = self.split();
        core.observe(&ctx.me)?;
        if !core.spawned {
            core.spawned = true;
            logic.on_spawn(core, ctx)?;
        }
        core.ticks += 1;
        logic.tick(core, ctx)
    }

    pub fn on_attack(&mut self, ctx: &mut TickContext<'_>, victim: PlayerId) -> BehaviorResult {
        let (core, logic) = self.split();
        core.observe(&ctx.me)?;
        logic.on_attack(core, ctx, victim)
    }

    pub fn on_damaged(
        &mut self,
        ctx: &mut TickContext<'_>,
        attacker: Option<EntityRef>,
        amount: f32,
    ) -> BehaviorResult {
        let (core, logic) = self.split();
        core.observe(&ctx.me)?;
        logic.on_damaged(core, ctx, attacker, amount)
    }

    /// Death hook followed by teardown.
    pub fn on_death(&mut self, ctx: &mut TickContext<'_>, killer: Option<PlayerId>) -> BehaviorResult {
        let (core, logic) = self.split();
        let result = logic.on_death(core, ctx, killer);
        logic.teardown(core, ctx);
        result
    }

    /// Releases world-visible resources without death effects.
    pub fn teardown(&mut self, ctx: &mut TickContext<'_>) {
        let (core, logic) = self.split();
        logic.teardown(core, ctx);
    }

    pub fn resolve(&mut self, ctx: &mut TickContext<'_>, action: DeferredAction) -> BehaviorResult<bool> {
        self.core.resolve(ctx, action)
    }

    /// Snapshot used when the world no longer knows the creature (death
    /// notifications for already removed entities).
    pub fn last_known_snapshot(&self) -> CreatureSnapshot {
        CreatureSnapshot {
            id: self.core.id,
            variant: self.core.variant,
            position: self.core.last_position,
            health: 0.0,
            max_health: 0.0,
            alive: false,
        }
    }
}
