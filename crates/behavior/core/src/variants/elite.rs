use super::VariantLogic;
use crate::deferred::{DeferredAction, Impact, ImpactSite};
use crate::env::{Radii, StatusEffect, StatusKind};
use crate::error::BehaviorResult;
use crate::events::Ability;
use crate::instance::{InstanceCore, TickContext};
use crate::types::{EntityRef, PlayerId};

/// Players within this radius hear phase announcements.
const AUDIENCE_RADIUS: f64 = 30.0;
const BASH_RANGE: f64 = 4.0;
const BASH_RADIUS: f64 = 2.0;
const PIERCE_RANGE: f64 = 5.0;

/// Elites: a short phase ladder, one ability per phase, and an enrage on
/// reaching the last phase.
#[derive(Clone, Debug, Default)]
pub struct EliteState;

impl EliteState {
    pub fn new() -> Self {
        Self
    }
}

fn audience(ctx: &TickContext<'_>) -> Vec<PlayerId> {
    ctx.world
        .nearby_players(ctx.position(), Radii::cube(AUDIENCE_RADIUS))
        .into_iter()
        .filter(|p| p.is_valid_target())
        .map(|p| p.id)
        .collect()
}

impl VariantLogic for EliteState {
    fn tick(&mut self, core: &mut InstanceCore, ctx: &mut TickContext<'_>) -> BehaviorResult {
        if core.phases.has_phases() {
            let listeners = audience(ctx);
            if core.check_phase(ctx, &listeners).is_some() && core.phases.is_final() {
                core.enrage(ctx);
            }
        }

        let Some(target) = core.acquire_target(ctx) else {
            return Ok(());
        };
        let now = ctx.now;
        if !core.can_act(now) || !core.ability.is_ready(now) {
            return Ok(());
        }
        let distance = ctx.position().distance(&target.position);
        let level = core.level as f32;

        match core.phases.current() {
            1 => {
                if distance <= BASH_RANGE {
                    core.ability.mark_used(now);
                    let bash = Impact::new(ImpactSite::Owner, BASH_RADIUS, 6.0 + level * 0.5)
                        .with_knockback(1.0)
                        .with_status(StatusEffect::new(StatusKind::Slowness, 40, 1));
                    let windup = core.descriptor.commit_ticks;
                    core.begin_commit(
                        ctx,
                        Ability::ShieldBash,
                        windup,
                        Some(DeferredAction::Impact(bash)),
                    );
                }
            }
            2 => {
                if distance <= PIERCE_RANGE {
                    core.ability.mark_used(now);
                    let victim = EntityRef::Player(target.id);
                    ctx.world.damage(victim, 8.0 + level, core.id);
                    ctx.world
                        .apply_status(victim, StatusEffect::new(StatusKind::Weakness, 100, 0));
                    core.report_ability(ctx, Ability::ArmorPierce);
                }
            }
            _ => {
                core.ability.mark_used(now);
                core.apply_self(ctx, StatusEffect::new(StatusKind::Resistance, 100, 1));
                core.report_ability(ctx, Ability::IronFortress);
            }
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
        core.counter_attack(ctx, attacker);
        Ok(())
    }
}
