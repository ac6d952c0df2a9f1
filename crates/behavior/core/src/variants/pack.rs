use super::VariantLogic;
use crate::deferred::{Impact, ImpactSite};
use crate::descriptor::BehaviorDescriptor;
use crate::env::{FxKind, Radii, StatusEffect, StatusKind};
use crate::error::BehaviorResult;
use crate::events::Ability;
use crate::instance::{InstanceCore, TickContext};
use crate::primitives::{Cooldown, PackTracker};
use crate::types::{EntityRef, PlayerId};

const HOWL_BELOW_BONUS: u8 = 3;
const HOWL_RANGE: f64 = 20.0;
const HOWL_DARKNESS_RADIUS: f64 = 15.0;
const HOWL_RALLY_RADIUS: f64 = 30.0;
const LEAP_MIN: f64 = 8.0;
const LEAP_MAX: f64 = 18.0;
const LEAP_IMPACT_DELAY: u64 = 10;
const BITE_RANGE: f64 = 4.0;
const BITE_INTERVAL: u64 = 15;

/// Pack hunters: stronger the more same-kind allies are nearby.
#[derive(Clone, Debug)]
pub struct PackState {
    pack: PackTracker,
    radius: f64,
    bite: Cooldown,
}

impl PackState {
    pub fn new(descriptor: &BehaviorDescriptor) -> Self {
        Self {
            pack: PackTracker::new(descriptor.pack_cap, descriptor.pack_refresh_interval),
            radius: descriptor.pack_radius,
            bite: Cooldown::new(BITE_INTERVAL),
        }
    }

    pub fn bonus(&self) -> u8 {
        self.pack.bonus()
    }

    fn howl(&self, core: &mut InstanceCore, ctx: &mut TickContext<'_>, target: PlayerId) {
        ctx.fx(FxKind::Howl);
        let origin = ctx.position();
        for player in ctx
            .world
            .nearby_players(origin, Radii::cube(HOWL_DARKNESS_RADIUS))
        {
            ctx.world.apply_status(
                EntityRef::Player(player.id),
                StatusEffect::new(StatusKind::Darkness, 60, 0),
            );
        }
        let kind = core.variant.kind;
        for ally in ctx
            .world
            .nearby_creatures(origin, Radii::cube(HOWL_RALLY_RADIUS))
            .into_iter()
            .filter(|c| c.alive && c.id != core.id && c.variant.kind == kind)
        {
            ctx.world.set_target(ally.id, Some(target));
            ctx.world.apply_status(
                EntityRef::Creature(ally.id),
                StatusEffect::new(StatusKind::Speed, 100, 1),
            );
        }
    }
}

impl VariantLogic for PackState {
    fn tick(&mut self, core: &mut InstanceCore, ctx: &mut TickContext<'_>) -> BehaviorResult {
        let now = ctx.now;
        let origin = ctx.position();
        let radius = self.radius;
        let kind = core.variant.kind;
        let me = core.id;
        {
            let world = &*ctx.world;
            self.pack.refresh_with(now, || {
                world
                    .nearby_creatures(origin, Radii::cube(radius))
                    .iter()
                    .filter(|c| {
                        c.alive
                            && c.id != me
                            && c.variant.kind == kind
                            && c.position.distance_squared(&origin) <= radius * radius
                    })
                    .count()
            });
        }

        let Some(target) = core.acquire_target(ctx) else {
            return Ok(());
        };
        if !core.can_act(now) {
            return Ok(());
        }
        let distance = origin.distance(&target.position);
        let bonus = f32::from(self.pack.bonus());
        let level = core.level as f32;

        if self.pack.bonus() < HOWL_BELOW_BONUS
            && distance < HOWL_RANGE
            && core.special.interval() > 0
            && core.special.try_use(now)
        {
            self.howl(core, ctx, target.id);
            core.report_ability(ctx, Ability::Howl);
        }

        if (LEAP_MIN..=LEAP_MAX).contains(&distance) && core.ability.try_use(now) {
            core.leap_towards(ctx, target.position, 1.5);
            let landing = Impact::new(ImpactSite::Owner, 2.0, 6.0 + level + bonus * 2.0)
                .targeting(target.id);
            ctx.schedule(LEAP_IMPACT_DELAY, landing.into());
            core.report_ability(ctx, Ability::Leap);
        } else if distance < BITE_RANGE && self.bite.try_use(now) {
            let victim = EntityRef::Player(target.id);
            ctx.world.damage(victim, 4.0 + level * 0.5 + bonus * 1.5, core.id);
            if ctx.roll(0.25 + 0.05 * bonus) {
                ctx.world
                    .apply_status(victim, StatusEffect::new(StatusKind::Wither, 60, 0));
            }
            core.report_ability(ctx, Ability::SavageBite);
        }
        Ok(())
    }

    fn on_attack(
        &mut self,
        core: &mut InstanceCore,
        ctx: &mut TickContext<'_>,
        victim: PlayerId,
    ) -> BehaviorResult {
        let bonus = f32::from(self.pack.bonus());
        let victim = EntityRef::Player(victim);
        if bonus > 0.0 {
            ctx.world.damage(victim, bonus * 2.0, core.id);
        }
        if ctx.roll(0.15 + 0.03 * bonus) {
            ctx.world
                .apply_status(victim, StatusEffect::new(StatusKind::Slowness, 40, 0));
        }
        Ok(())
    }
}
