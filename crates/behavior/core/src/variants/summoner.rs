use super::VariantLogic;
use crate::config::EngineConfig;
use crate::deferred::{DeferredAction, Impact, ImpactSite, MinionPool};
use crate::env::{FxKind, StatusEffect, StatusKind};
use crate::error::BehaviorResult;
use crate::events::{Ability, BehaviorEvent};
use crate::instance::{InstanceCore, TickContext};
use crate::primitives::Cooldown;
use crate::types::{EntityRef, PlayerId};

const RETREAT_RANGE: f64 = 6.0;
const BOLT_RANGE: f64 = 15.0;
/// Blocks a dark bolt travels per tick.
const BOLT_SPEED: f64 = 1.5;
const RITUAL_BELOW: f32 = 0.4;
const RITUAL_TICKS: u64 = 100;
const RITUAL_HEAL: f32 = 0.4;
const RITUAL_SHADOWS: u8 = 2;
const INTERRUPT_CHANCE: f32 = 0.3;
const EMERGENCY_BELOW: f32 = 0.2;
const EMERGENCY_DISTANCE: f64 = 10.0;
const FURY_TICKS: u64 = 200;
const MINION_LEVEL_OFFSET: u32 = 3;

/// Summoners fight through their minions: they keep their distance, raise
/// undead on cooldown, and fall back on a channelled ritual when hurt.
#[derive(Clone, Debug)]
pub struct SummonerState {
    ritual: Cooldown,
    emergency: Cooldown,
}

impl Default for SummonerState {
    fn default() -> Self {
        Self::new()
    }
}

impl SummonerState {
    pub fn new() -> Self {
        Self {
            ritual: Cooldown::new(EngineConfig::seconds(30)),
            emergency: Cooldown::new(EngineConfig::seconds(5)),
        }
    }

    fn complete_ritual(&mut self, core: &mut InstanceCore, ctx: &mut TickContext<'_>) {
        core.heal_fraction(ctx, RITUAL_HEAL);
        for minion in core.minions.iter() {
            let minion = EntityRef::Creature(minion);
            ctx.world
                .apply_status(minion, StatusEffect::new(StatusKind::Strength, FURY_TICKS, 1));
            ctx.world
                .apply_status(minion, StatusEffect::new(StatusKind::Speed, FURY_TICKS, 1));
        }
        let target = core.target;
        let level = core.level;
        core.summon(ctx, RITUAL_SHADOWS, level, MinionPool::Shadows, target);
        ctx.fx(FxKind::Heal);
        ctx.emit(BehaviorEvent::RitualCompleted { creature: core.id });
    }
}

impl VariantLogic for SummonerState {
    fn tick(&mut self, core: &mut InstanceCore, ctx: &mut TickContext<'_>) -> BehaviorResult {
        let now = ctx.now;
        {
            let world = &*ctx.world;
            core.minions.prune(|id| world.is_creature_valid(id));
        }

        if core.channel.poll_complete(now) {
            self.complete_ritual(core, ctx);
        }
        if core.channel.is_active() {
            ctx.fx(FxKind::Channel);
            return Ok(());
        }

        let Some(target) = core.acquire_target(ctx) else {
            return Ok(());
        };
        let distance = ctx.position().distance(&target.position);
        if distance < RETREAT_RANGE {
            core.retreat_from(ctx, target.position, 0.8);
        }
        if !core.can_act(now) {
            return Ok(());
        }

        if core.health_below(RITUAL_BELOW) && self.ritual.try_use(now) {
            core.channel.start(now, RITUAL_TICKS);
            core.apply_self(ctx, StatusEffect::new(StatusKind::Slowness, RITUAL_TICKS, 3));
            ctx.fx(FxKind::Channel);
            core.report_ability(ctx, Ability::DarkRitual);
            return Ok(());
        }

        if core.ability.is_ready(now) && core.minions.remaining_capacity() > 0 {
            let count = if ctx.roll(0.5) { 3 } else { 2 };
            let summon = DeferredAction::SummonMinions {
                count,
                level: core.level.saturating_sub(MINION_LEVEL_OFFSET).max(1),
                pool: MinionPool::Undead,
                target: Some(target.id),
            };
            let windup = core.descriptor.commit_ticks;
            if core.begin_commit(ctx, Ability::Summon, windup, Some(summon)) {
                core.ability.mark_used(now);
                core.apply_self(ctx, StatusEffect::new(StatusKind::Slowness, windup, 2));
                return Ok(());
            }
        }

        if distance <= BOLT_RANGE && core.special.interval() > 0 && core.special.try_use(now) {
            let travel = ((distance / BOLT_SPEED).ceil() as u64).max(1);
            let bolt = Impact::new(ImpactSite::Target, 1.0, 4.0 + core.level as f32)
                .targeting(target.id)
                .with_drain(0.5)
                .with_status(StatusEffect::new(StatusKind::Wither, 40, 0));
            ctx.schedule(travel, bolt.into());
            core.report_ability(ctx, Ability::DarkBolt);
        }
        Ok(())
    }

    fn on_attack(
        &mut self,
        core: &mut InstanceCore,
        ctx: &mut TickContext<'_>,
        victim: PlayerId,
    ) -> BehaviorResult {
        let drain = 2.0 + core.level as f32 * 0.5;
        ctx.world.damage(EntityRef::Player(victim), drain, core.id);
        core.heal(ctx, drain * 0.8);
        Ok(())
    }

    fn on_damaged(
        &mut self,
        core: &mut InstanceCore,
        ctx: &mut TickContext<'_>,
        attacker: Option<EntityRef>,
        _amount: f32,
    ) -> BehaviorResult {
        if core.channel.try_interrupt(&mut *ctx.rng, INTERRUPT_CHANCE) {
            ctx.fx(FxKind::ChannelBroken);
            ctx.emit(BehaviorEvent::RitualInterrupted { creature: core.id });
        }

        let Some(player) = attacker
            .and_then(EntityRef::as_player)
            .filter(|&id| ctx.world.valid_player(id).is_some())
        else {
            return Ok(());
        };
        for minion in core.minions.iter() {
            ctx.world.set_target(minion, Some(player));
        }

        if core.health_below(EMERGENCY_BELOW) && self.emergency.try_use(ctx.now) {
            let origin = ctx.position();
            if let Some(spot) =
                ctx.find_ground_near(origin, EMERGENCY_DISTANCE * 0.5, EMERGENCY_DISTANCE)
            {
                ctx.world.play_effect(FxKind::Teleport, origin);
                ctx.world.teleport(core.id, spot);
            }
        }
        Ok(())
    }

    fn on_death(
        &mut self,
        core: &mut InstanceCore,
        ctx: &mut TickContext<'_>,
        _killer: Option<PlayerId>,
    ) -> BehaviorResult {
        for minion in core.minions.release() {
            if !ctx.world.is_creature_valid(minion) {
                continue;
            }
            let minion = EntityRef::Creature(minion);
            ctx.world
                .apply_status(minion, StatusEffect::new(StatusKind::Strength, FURY_TICKS, 2));
            ctx.world
                .apply_status(minion, StatusEffect::new(StatusKind::Wither, FURY_TICKS, 0));
        }
        Ok(())
    }

    fn teardown(&mut self, core: &mut InstanceCore, _ctx: &mut TickContext<'_>) {
        core.channel.cancel();
    }
}
