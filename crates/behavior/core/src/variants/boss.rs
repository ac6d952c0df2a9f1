//! Boss encounters.
//!
//! Every pass a boss refreshes its participant set and encounter bar, checks
//! its phase ladder and leash, and, when idle, picks the next ability from a
//! per-kind rotation. Cleave and blood frenzy land at once; every other
//! ability goes through the commit cycle, which for some bosses ends in a
//! vulnerability window.

use tracing::debug;

use super::VariantLogic;
use crate::deferred::{DeferredAction, Impact, ImpactSite, MinionPool};
use crate::descriptor::BehaviorDescriptor;
use crate::env::{
    Announcement, EncounterBar, EncounterUpdate, FxKind, PlayerSnapshot, Radii, StatusEffect,
    StatusKind,
};
use crate::error::BehaviorResult;
use crate::events::{Ability, BehaviorEvent};
use crate::instance::{InstanceCore, TickContext};
use crate::primitives::{Leash, LeashCheck, ParticipantSet};
use crate::types::{CreatureId, EntityRef, Location, PlayerId};
use crate::variant::VariantKind;

const CLEAVE_RADIUS: f64 = 4.0;
const EXECUTE_RANGE: f64 = 4.0;
const EXECUTE_BELOW: f32 = 0.3;
const SLAM_RANGE: f64 = 8.0;
const THROW_MIN: f64 = 6.0;
const THROW_MAX: f64 = 30.0;
const EARTHQUAKE_WAVES: u8 = 5;
const EARTHQUAKE_INTERVAL: u64 = 10;
const FRENZY_TICKS: u64 = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum BossAbility {
    Cleave,
    BloodFrenzy,
    ExecutionStrike,
    GroundSlam,
    RaiseDead,
    BoulderThrow,
    Earthquake,
}

impl BossAbility {
    pub fn ability(self) -> Ability {
        match self {
            Self::Cleave => Ability::Cleave,
            Self::BloodFrenzy => Ability::BloodFrenzy,
            Self::ExecutionStrike => Ability::ExecutionStrike,
            Self::GroundSlam => Ability::GroundSlam,
            Self::RaiseDead => Ability::RaiseDead,
            Self::BoulderThrow => Ability::BoulderThrow,
            Self::Earthquake => Ability::Earthquake,
        }
    }

    /// Regular abilities, tried in order until one applies.
    pub fn rotation(kind: VariantKind, phase: u8) -> &'static [BossAbility] {
        use BossAbility::*;
        match (kind, phase) {
            (VariantKind::Butcher, 1) => &[Cleave],
            (VariantKind::Butcher, _) => &[ExecutionStrike, Cleave],
            (VariantKind::Gravedigger, _) => &[GroundSlam, BoulderThrow],
            (VariantKind::PatientZero, 1) => &[BoulderThrow, GroundSlam],
            (VariantKind::PatientZero, _) => &[GroundSlam, BoulderThrow],
            _ => &[GroundSlam],
        }
    }

    /// Special ability available from the given phase on.
    pub fn special(kind: VariantKind, phase: u8) -> Option<BossAbility> {
        match (kind, phase) {
            (_, 1) => None,
            (VariantKind::Butcher, _) => Some(Self::BloodFrenzy),
            (VariantKind::Gravedigger, _) => Some(Self::RaiseDead),
            (VariantKind::PatientZero, 2) => Some(Self::RaiseDead),
            (VariantKind::PatientZero, _) => Some(Self::Earthquake),
            _ => None,
        }
    }
}

/// Encounter state reported to administration tools.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncounterSummary {
    pub boss: CreatureId,
    pub kind: VariantKind,
    pub phase: u8,
    pub phases: u8,
    pub health: f32,
    pub participants: Vec<PlayerId>,
    pub vulnerable: bool,
    pub enraged: bool,
}

#[derive(Clone, Debug)]
pub struct BossState {
    participants: ParticipantSet,
    leash: Option<Leash>,
    bar_open: bool,
}

impl BossState {
    pub fn new(descriptor: &BehaviorDescriptor, anchor: Location) -> Self {
        Self {
            participants: ParticipantSet::new(
                descriptor.detection_radius,
                descriptor.release_radius,
            ),
            leash: descriptor
                .leash_radius
                .map(|radius| Leash::new(anchor, radius, descriptor.leash_check_interval)),
            bar_open: false,
        }
    }

    pub fn participants(&self) -> &ParticipantSet {
        &self.participants
    }

    pub fn is_bar_open(&self) -> bool {
        self.bar_open
    }

    pub fn summary(&self, core: &InstanceCore) -> EncounterSummary {
        EncounterSummary {
            boss: core.id,
            kind: core.variant.kind,
            phase: core.phases.current(),
            phases: core.phases.phase_count(),
            health: core.last_health_ratio,
            participants: self.participants.members(),
            vulnerable: core.commit.is_vulnerable(),
            enraged: core.is_enraged(),
        }
    }

    fn refresh_participants(&mut self, core: &InstanceCore, ctx: &mut TickContext<'_>) {
        let center = ctx.position();
        let nearby = ctx
            .world
            .nearby_players(center, Radii::cube(self.participants.detection_radius()));
        let changes = {
            let world = &*ctx.world;
            self.participants
                .update(&center, &nearby, |id| world.player(id))
        };
        for player in changes.joined {
            ctx.world.encounter(core.id, EncounterUpdate::Join(player));
            ctx.emit(BehaviorEvent::EncounterJoined {
                boss: core.id,
                player,
            });
        }
        for player in changes.left {
            ctx.world.encounter(core.id, EncounterUpdate::Leave(player));
            ctx.emit(BehaviorEvent::EncounterLeft {
                boss: core.id,
                player,
            });
        }
    }

    fn refresh_bar(&mut self, core: &InstanceCore, ctx: &mut TickContext<'_>) {
        let bar = EncounterBar {
            title: core.variant.kind.display_name().to_string(),
            progress: core.last_health_ratio,
            phase: core.phases.current(),
            phases: core.phases.phase_count(),
            vulnerable: core.commit.is_vulnerable(),
        };
        ctx.world.encounter(core.id, EncounterUpdate::Progress(bar));
        self.bar_open = true;
    }

    /// Returns `true` when the boss was pulled back to its anchor.
    fn enforce_leash(&mut self, core: &mut InstanceCore, ctx: &mut TickContext<'_>) -> bool {
        let Some(leash) = self.leash.as_mut() else {
            return false;
        };
        if leash.check(ctx.now, &ctx.position()) != LeashCheck::Exceeded {
            return false;
        }
        let anchor = leash.anchor();
        ctx.world.teleport(core.id, anchor);
        ctx.world.play_effect(FxKind::Teleport, anchor);
        core.clear_target(ctx);
        ctx.emit(BehaviorEvent::Leashed {
            creature: core.id,
            anchor,
        });
        debug!(target: "behavior::variant", creature = %core.id, %anchor, "leash reset");
        true
    }

    /// Attempts `ability`; returns whether it started.
    fn execute(
        &mut self,
        core: &mut InstanceCore,
        ctx: &mut TickContext<'_>,
        ability: BossAbility,
        target: &PlayerSnapshot,
    ) -> bool {
        let distance = ctx.position().distance(&target.position);
        let level = core.level as f32;
        let windup = core.descriptor.commit_ticks;
        let phase = core.phases.current();

        let payload = match ability {
            BossAbility::Cleave => {
                if distance > CLEAVE_RADIUS {
                    return false;
                }
                let cleave = Impact::new(ImpactSite::Owner, CLEAVE_RADIUS, 10.0 + level)
                    .with_status(StatusEffect::new(StatusKind::Slowness, 40, 1));
                core.strike(ctx, &cleave);
                core.report_ability(ctx, ability.ability());
                return true;
            }
            BossAbility::ExecutionStrike => {
                if distance > EXECUTE_RANGE || target.health_ratio() >= EXECUTE_BELOW {
                    return false;
                }
                Impact::new(ImpactSite::Target, 1.5, 30.0)
                    .targeting(target.id)
                    .into()
            }
            BossAbility::GroundSlam => {
                if distance > SLAM_RANGE {
                    return false;
                }
                Impact::new(ImpactSite::Owner, 6.0, 12.0 + level * 0.5)
                    .with_knockback(1.2)
                    .into()
            }
            BossAbility::BoulderThrow => {
                if !(THROW_MIN..=THROW_MAX).contains(&distance) {
                    return false;
                }
                Impact::new(ImpactSite::At(target.position), 3.0, 15.0)
                    .targeting(target.id)
                    .with_knockback(0.8)
                    .into()
            }
            BossAbility::RaiseDead => {
                if core.minions.remaining_capacity() == 0 {
                    return false;
                }
                DeferredAction::SummonMinions {
                    count: 1 + phase,
                    level: core.level.saturating_sub(2),
                    pool: MinionPool::Skeletons,
                    target: Some(target.id),
                }
            }
            BossAbility::Earthquake => DeferredAction::Shockwave {
                origin: ctx.position(),
                wave: 1,
                waves: EARTHQUAKE_WAVES,
                interval: EARTHQUAKE_INTERVAL,
                damage: 6.0,
            },
            BossAbility::BloodFrenzy => {
                core.apply_self(ctx, StatusEffect::new(StatusKind::Speed, FRENZY_TICKS, 1));
                core.apply_self(ctx, StatusEffect::new(StatusKind::Strength, FRENZY_TICKS, 1));
                if core.phases.is_final() {
                    core.enrage(ctx);
                }
                core.report_ability(ctx, ability.ability());
                return true;
            }
        };

        core.begin_commit(ctx, ability.ability(), windup, Some(payload))
    }
}

impl VariantLogic for BossState {
    fn on_spawn(&mut self, core: &mut InstanceCore, ctx: &mut TickContext<'_>) -> BehaviorResult {
        let radius = self.participants.detection_radius();
        let witnesses: Vec<PlayerId> = ctx
            .world
            .nearby_players(ctx.position(), Radii::cube(radius))
            .into_iter()
            .filter(|p| p.online)
            .map(|p| p.id)
            .collect();
        if !witnesses.is_empty() {
            let announcement =
                Announcement::new(core.variant.kind.display_name(), "has awakened");
            ctx.world.announce(&witnesses, &announcement);
        }
        Ok(())
    }

    fn tick(&mut self, core: &mut InstanceCore, ctx: &mut TickContext<'_>) -> BehaviorResult {
        {
            let world = &*ctx.world;
            core.minions.prune(|id| world.is_creature_valid(id));
        }
        self.refresh_participants(core, ctx);
        let audience = self.participants.members();
        core.check_phase(ctx, &audience);
        self.refresh_bar(core, ctx);

        if self.enforce_leash(core, ctx) {
            return Ok(());
        }

        let now = ctx.now;
        if !core.can_act(now) {
            return Ok(());
        }
        let Some(target) = core.acquire_target(ctx) else {
            return Ok(());
        };

        let phase = core.phases.current();
        let kind = core.variant.kind;

        if core.special.interval() > 0
            && core.special.is_ready(now)
            && let Some(special) = BossAbility::special(kind, phase)
            && self.execute(core, ctx, special, &target)
        {
            core.special.mark_used(now);
            return Ok(());
        }

        if core.ability.is_ready(now) {
            for &ability in BossAbility::rotation(kind, phase) {
                if self.execute(core, ctx, ability, &target) {
                    core.ability.mark_used(now);
                    break;
                }
            }
        }
        Ok(())
    }

    fn on_attack(
        &mut self,
        core: &mut InstanceCore,
        ctx: &mut TickContext<'_>,
        victim: PlayerId,
    ) -> BehaviorResult {
        let bonus = core.descriptor.bonus_damage;
        if bonus > 0.0 {
            ctx.world.damage(EntityRef::Player(victim), bonus, core.id);
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
        if !core.commit.is_vulnerable() {
            core.counter_attack(ctx, attacker);
        }
        Ok(())
    }

    fn on_death(
        &mut self,
        core: &mut InstanceCore,
        ctx: &mut TickContext<'_>,
        killer: Option<PlayerId>,
    ) -> BehaviorResult {
        let participants = self.participants.members();
        if !participants.is_empty() {
            let subtitle = match killer {
                Some(player) => format!("Final blow by {player}"),
                None => "Victory!".to_string(),
            };
            let announcement = Announcement::new(
                format!("{} defeated", core.variant.kind.display_name()),
                subtitle,
            );
            ctx.world.announce(&participants, &announcement);
        }
        ctx.fx(FxKind::Victory);

        let minions = core.minions.release();
        if core.variant.kind == VariantKind::Gravedigger {
            for minion in minions {
                ctx.world.despawn(minion);
            }
        }
        Ok(())
    }

    fn teardown(&mut self, core: &mut InstanceCore, ctx: &mut TickContext<'_>) {
        self.participants.clear();
        if self.bar_open {
            ctx.world.encounter(core.id, EncounterUpdate::Close);
            self.bar_open = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_later_phases_unlock_specials() {
        for kind in [VariantKind::Butcher, VariantKind::Gravedigger, VariantKind::PatientZero] {
            assert_eq!(BossAbility::special(kind, 1), None);
            assert!(BossAbility::special(kind, 2).is_some());
        }
        assert_eq!(
            BossAbility::special(VariantKind::PatientZero, 3),
            Some(BossAbility::Earthquake)
        );
    }

    #[test]
    fn every_boss_has_a_rotation() {
        for kind in [VariantKind::Butcher, VariantKind::Gravedigger, VariantKind::PatientZero] {
            for phase in 1..=4 {
                assert!(!BossAbility::rotation(kind, phase).is_empty());
            }
        }
    }
}
