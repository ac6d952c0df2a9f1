use super::VariantLogic;
use crate::env::{FxKind, Radii, StatusEffect, StatusKind};
use crate::error::BehaviorResult;
use crate::events::Ability;
use crate::instance::{InstanceCore, TickContext};
use crate::primitives::Cooldown;
use crate::types::{EntityRef, Tick};
use crate::variant::VariantKind;

const GROAN_CHANCE: f32 = 0.3;
const GROAN_RADIUS: f64 = 12.0;
const GROAN_ALERTS: usize = 3;
const POUNCE_RANGE: f64 = 6.0;
const LASH_RANGE: f64 = 8.0;
const BURST_RANGE: f64 = 16.0;
const FLEE_BELOW: f32 = 0.3;
const FORTIFY_BELOW: f32 = 0.5;
/// Minimum gap between two defensive reactions.
const REACTION_INTERVAL: u64 = 60;

/// Common creatures: one trick each, keyed by kind.
#[derive(Clone, Debug)]
pub struct BasicState {
    kind: VariantKind,
    reaction: Cooldown,
}

impl BasicState {
    pub fn new(kind: VariantKind) -> Self {
        Self {
            kind,
            reaction: Cooldown::new(REACTION_INTERVAL),
        }
    }

    fn reaction_ready(&mut self, now: Tick) -> bool {
        self.reaction.try_use(now)
    }
}

impl VariantLogic for BasicState {
    fn tick(&mut self, core: &mut InstanceCore, ctx: &mut TickContext<'_>) -> BehaviorResult {
        let Some(target) = core.acquire_target(ctx) else {
            return Ok(());
        };
        if !core.can_act(ctx.now) {
            return Ok(());
        }
        let now = ctx.now;
        let distance = ctx.position().distance(&target.position);

        match self.kind {
            VariantKind::Walker => {
                if core.ability.is_ready(now) && ctx.roll(GROAN_CHANCE) {
                    core.ability.mark_used(now);
                    ctx.fx(FxKind::Groan);
                    core.report_ability(ctx, Ability::Groan);
                    let allies = ctx
                        .world
                        .nearby_creatures(ctx.position(), Radii::cube(GROAN_RADIUS));
                    for ally in allies
                        .iter()
                        .filter(|c| c.alive && c.id != core.id)
                        .take(GROAN_ALERTS)
                    {
                        ctx.world.set_target(ally.id, Some(target.id));
                    }
                }
            }
            VariantKind::Crawler => {
                if distance < POUNCE_RANGE && core.ability.try_use(now) {
                    core.leap_towards(ctx, target.position, 1.2);
                    core.report_ability(ctx, Ability::Pounce);
                }
            }
            VariantKind::Runner => {
                if distance < BURST_RANGE && core.ability.try_use(now) {
                    core.apply_self(ctx, StatusEffect::new(StatusKind::Speed, 60, 1));
                    core.report_ability(ctx, Ability::SpeedBurst);
                }
            }
            VariantKind::Mummy => {
                if distance <= LASH_RANGE && core.ability.try_use(now) {
                    ctx.world.apply_status(
                        EntityRef::Player(target.id),
                        StatusEffect::new(StatusKind::Slowness, 60, 1),
                    );
                    core.report_ability(ctx, Ability::BandageLash);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn on_damaged(
        &mut self,
        core: &mut InstanceCore,
        ctx: &mut TickContext<'_>,
        attacker: Option<EntityRef>,
        _amount: f32,
    ) -> BehaviorResult {
        match self.kind {
            VariantKind::Runner if core.health_below(FLEE_BELOW) => {
                let threat = attacker
                    .and_then(EntityRef::as_player)
                    .and_then(|id| ctx.world.player(id));
                if let Some(threat) = threat
                    && self.reaction_ready(ctx.now)
                {
                    core.retreat_from(ctx, threat.position, 1.0);
                }
            }
            VariantKind::Shambler if core.health_below(FORTIFY_BELOW) => {
                if self.reaction_ready(ctx.now) {
                    core.apply_self(ctx, StatusEffect::new(StatusKind::Resistance, 60, 0));
                }
            }
            _ => {}
        }
        Ok(())
    }
}
