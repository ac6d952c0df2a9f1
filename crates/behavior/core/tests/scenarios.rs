//! End-to-end behaviour scenarios against the in-memory world.

use behavior_core::mock::{EffectCall, MockWorld};
use behavior_core::primitives::Cooldown;
use behavior_core::{
    Ability, BehaviorDescriptor, BehaviorEvent, BehaviorFlags, BehaviorManager, Category,
    CreatureId, DeferredAction, DescriptorTable, EncounterUpdate, EngineConfig, EntityRef, FxKind,
    Location, MinionPool, RemovalReason, StatusEffect, StatusKind, Tick, Variant, VariantKind,
};
use rand::rngs::mock::StepRng;

const ORIGIN: Location = Location::new(0.0, 64.0, 0.0);

fn at(x: f64) -> Location {
    Location::new(x, 64.0, 0.0)
}

/// Manager whose rolls always succeed and whose range draws return the low
/// end.
fn manager_with(table: DescriptorTable) -> BehaviorManager {
    BehaviorManager::new(table, EngineConfig::new().with_rng_seed(7)).with_rng(StepRng::new(0, 0))
}

fn manager() -> BehaviorManager {
    manager_with(DescriptorTable::standard())
}

fn spawn(
    manager: &mut BehaviorManager,
    world: &mut MockWorld,
    kind: VariantKind,
    position: Location,
) -> CreatureId {
    let id = world.add_creature(Variant::of(kind), position);
    manager
        .register(id, Variant::of(kind), 10, position)
        .expect("standard variants register");
    id
}

/// Resolves a summon for `owner` right away and returns its minions.
fn summon_now(
    manager: &mut BehaviorManager,
    world: &mut MockWorld,
    owner: CreatureId,
    count: u8,
    pool: MinionPool,
) -> Vec<CreatureId> {
    manager.schedule(
        Tick(0),
        owner,
        1,
        DeferredAction::SummonMinions {
            count,
            level: 5,
            pool,
            target: None,
        },
    );
    manager.run_deferred(Tick(1), world);
    manager.get(owner).unwrap().core().minions.iter().collect()
}

fn summoned(events: &[BehaviorEvent]) -> Vec<(u8, usize)> {
    events
        .iter()
        .filter_map(|e| match e {
            BehaviorEvent::MinionsSummoned {
                requested, minions, ..
            } => Some((*requested, minions.len())),
            _ => None,
        })
        .collect()
}

fn statuses_on(world: &MockWorld, creature: CreatureId) -> Vec<StatusEffect> {
    world
        .calls()
        .iter()
        .filter_map(|call| match call {
            EffectCall::Status { target, effect } if *target == EntityRef::Creature(creature) => {
                Some(*effect)
            }
            _ => None,
        })
        .collect()
}

fn pack_bonus(manager: &BehaviorManager, id: CreatureId) -> u8 {
    manager
        .get(id)
        .and_then(|instance| instance.state().as_pack())
        .map(|pack| pack.bonus())
        .unwrap()
}

fn phase_shifts(world: &MockWorld) -> usize {
    world.count(|call| matches!(call, EffectCall::Fx { kind: FxKind::PhaseShift, .. }))
}

#[test]
fn large_health_drop_advances_one_phase() {
    let mut butcher = BehaviorDescriptor::standard(VariantKind::Butcher);
    butcher.phase_thresholds = vec![0.5];
    let mut table = DescriptorTable::standard();
    table.upsert(butcher).unwrap();

    let mut manager = manager_with(table);
    let mut world = MockWorld::new();
    let boss = spawn(&mut manager, &mut world, VariantKind::Butcher, ORIGIN);

    manager.tick_all(Tick(1), &mut world);
    assert_eq!(manager.get(boss).unwrap().phase(), 1);

    world.set_health(boss, 8.0);
    manager.tick_all(Tick(2), &mut world);
    manager.tick_all(Tick(3), &mut world);

    assert_eq!(manager.get(boss).unwrap().phase(), 2);
    assert_eq!(phase_shifts(&world), 1);
    let changes = manager
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, BehaviorEvent::PhaseChanged { .. }))
        .count();
    assert_eq!(changes, 1);
}

#[test]
fn phases_climb_one_step_per_pass() {
    let mut manager = manager();
    let mut world = MockWorld::new();
    let boss = spawn(&mut manager, &mut world, VariantKind::PatientZero, ORIGIN);

    let mut seen = Vec::new();
    for t in 1..=5 {
        // Transitions heal; keep the boss near death.
        world.set_health(boss, 1.0);
        manager.tick_all(Tick(t), &mut world);
        seen.push(manager.get(boss).unwrap().phase());
    }
    assert_eq!(seen, vec![2, 3, 4, 4, 4]);
    assert_eq!(phase_shifts(&world), 3);
}

#[test]
fn cooldown_ready_exactly_at_interval() {
    let mut cooldown = Cooldown::new(100);
    assert!(cooldown.is_ready(Tick(0)));
    cooldown.mark_used(Tick(0));
    assert!(!cooldown.is_ready(Tick(99)));
    assert!(cooldown.is_ready(Tick(100)));
}

#[test]
fn leashed_boss_returns_to_anchor() {
    let mut manager = manager();
    let mut world = MockWorld::new();
    let boss = spawn(&mut manager, &mut world, VariantKind::Gravedigger, ORIGIN);
    world.add_player(at(20.0));

    manager.tick_all(Tick(1), &mut world);
    assert!(manager.get(boss).unwrap().core().target.is_some());

    world.move_creature(boss, at(45.0));
    world.take_calls();
    manager.tick_all(Tick(21), &mut world);

    let calls = world.calls();
    assert!(calls.contains(&EffectCall::Teleport {
        creature: boss,
        to: ORIGIN
    }));
    assert!(calls.contains(&EffectCall::SetTarget {
        creature: boss,
        target: None
    }));
    assert!(manager.get(boss).unwrap().core().target.is_none());
    assert!(
        manager
            .drain_events()
            .contains(&BehaviorEvent::Leashed {
                creature: boss,
                anchor: ORIGIN
            })
    );
}

#[test]
fn boss_within_leash_stays_put() {
    let mut manager = manager();
    let mut world = MockWorld::new();
    let boss = spawn(&mut manager, &mut world, VariantKind::Gravedigger, ORIGIN);

    world.move_creature(boss, at(40.0));
    manager.tick_all(Tick(1), &mut world);
    manager.tick_all(Tick(21), &mut world);

    assert_eq!(
        world.count(|call| matches!(call, EffectCall::Teleport { .. })),
        0
    );
}

#[test]
fn summon_is_limited_by_ground() {
    let mut manager = manager();
    let mut world = MockWorld::new();
    let necromancer = spawn(&mut manager, &mut world, VariantKind::Necromancer, ORIGIN);

    world.script_ground([Some(at(4.0))]);
    world.set_solid_ground(false);
    manager.schedule(
        Tick(0),
        necromancer,
        1,
        DeferredAction::SummonMinions {
            count: 3,
            level: 5,
            pool: MinionPool::Undead,
            target: None,
        },
    );
    assert_eq!(manager.run_deferred(Tick(1), &mut world), 1);

    let instance = manager.get(necromancer).unwrap();
    assert_eq!(instance.core().minions.len(), 1);
    assert_eq!(
        world.count(|call| matches!(call, EffectCall::Spawned { .. })),
        1
    );
    let summoned = manager.drain_events().into_iter().find_map(|e| match e {
        BehaviorEvent::MinionsSummoned {
            requested, minions, ..
        } => Some((requested, minions.len())),
        _ => None,
    });
    assert_eq!(summoned, Some((3, 1)));
    assert_eq!(manager.metrics().snapshot().faults, 0);
}

#[test]
fn notifications_for_unknown_ids_are_ignored() {
    let mut manager = manager();
    let mut world = MockWorld::new();
    let stranger = CreatureId(99);

    manager.dispatch_damaged(Tick(1), &mut world, stranger, None, 5.0);
    manager.dispatch_attack(Tick(1), &mut world, stranger, behavior_core::PlayerId(1));
    manager.dispatch_death(Tick(1), &mut world, stranger, None);

    assert!(world.calls().is_empty());
    assert!(manager.drain_events().is_empty());
    assert_eq!(manager.stats().removed, 0);
}

#[test]
fn commit_then_vulnerability_window() {
    let mut manager = manager();
    let mut world = MockWorld::new();
    let boss = spawn(&mut manager, &mut world, VariantKind::Gravedigger, ORIGIN);
    let player = world.add_player(at(5.0));

    manager.tick_all(Tick(1), &mut world);
    assert_eq!(
        manager.get(boss).unwrap().flags(),
        BehaviorFlags::COMMITTING
    );

    manager.run_deferred(Tick(20), &mut world);
    assert_eq!(world.damage_to(EntityRef::Player(player)), 0.0);

    manager.run_deferred(Tick(21), &mut world);
    assert_eq!(world.damage_to(EntityRef::Player(player)), 17.0);
    assert_eq!(
        manager.get(boss).unwrap().flags(),
        BehaviorFlags::VULNERABLE
    );
    assert!(manager.encounters()[0].vulnerable);

    // No counter-attacks while exposed.
    manager.dispatch_damaged(Tick(30), &mut world, boss, Some(EntityRef::Player(player)), 4.0);
    assert_eq!(world.damage_to(EntityRef::Player(player)), 17.0);

    manager.run_deferred(Tick(81), &mut world);
    assert!(manager.get(boss).unwrap().flags().is_empty());
    assert!(
        manager
            .drain_events()
            .contains(&BehaviorEvent::VulnerabilityClosed { creature: boss })
    );

    manager.dispatch_damaged(Tick(82), &mut world, boss, Some(EntityRef::Player(player)), 4.0);
    assert_eq!(world.damage_to(EntityRef::Player(player)), 21.0);
}

#[test]
fn boss_death_closes_encounter_and_despawns_minions() {
    let mut manager = manager();
    let mut world = MockWorld::new();
    let boss = spawn(&mut manager, &mut world, VariantKind::Gravedigger, ORIGIN);
    let player = world.add_player(at(30.0));

    manager.tick_all(Tick(1), &mut world);
    assert_eq!(manager.encounters()[0].participants, vec![player]);

    manager.schedule(
        Tick(1),
        boss,
        1,
        DeferredAction::SummonMinions {
            count: 2,
            level: 8,
            pool: MinionPool::Skeletons,
            target: Some(player),
        },
    );
    manager.run_deferred(Tick(2), &mut world);
    assert_eq!(manager.get(boss).unwrap().core().minions.len(), 2);

    world.kill(boss);
    manager.dispatch_death(Tick(3), &mut world, boss, Some(player));

    assert!(!manager.contains(boss));
    assert!(manager.encounters().is_empty());
    assert_eq!(
        world.count(|call| matches!(call, EffectCall::Despawned(_))),
        2
    );
    assert_eq!(world.encounter_updates(boss).last(), Some(&&EncounterUpdate::Close));
    assert!(manager.drain_events().contains(&BehaviorEvent::Removed {
        creature: boss,
        reason: RemovalReason::Died
    }));
}

#[test]
fn elite_enrages_once() {
    let mut manager = manager();
    let mut world = MockWorld::new();
    let elite = spawn(&mut manager, &mut world, VariantKind::ArmoredElite, ORIGIN);

    world.set_health(elite, 2.0);
    for t in 1..=6 {
        manager.tick_all(Tick(t), &mut world);
    }

    let enrages = world.count(|call| {
        matches!(
            call,
            EffectCall::Attribute { factor, .. } if *factor == behavior_core::instance::ENRAGE_SPEED
        )
    });
    assert_eq!(enrages, 1);
    assert!(manager.get(elite).unwrap().flags().contains(BehaviorFlags::ENRAGED));
}

#[test]
fn faults_stay_inside_one_instance() {
    let mut manager = manager();
    let mut world = MockWorld::new();
    world.add_player(at(3.0));
    let cursed = at(-10.0);
    let faulty = spawn(&mut manager, &mut world, VariantKind::Walker, cursed);
    let healthy = spawn(&mut manager, &mut world, VariantKind::Runner, ORIGIN);
    let broken = spawn(&mut manager, &mut world, VariantKind::Shambler, at(1.0));
    world.panic_when_searching_from(cursed);
    world.set_health(broken, f32::NAN);

    let report = manager.tick_all(Tick(1), &mut world);

    assert_eq!(report.ticked, 1);
    assert_eq!(report.faults, 2);
    assert!(manager.get(healthy).unwrap().core().target.is_some());
    assert!(manager.contains(faulty));

    let codes: Vec<(CreatureId, String)> = manager
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            BehaviorEvent::Fault { creature, code, .. } => Some((creature, code)),
            _ => None,
        })
        .collect();
    assert!(codes.contains(&(faulty, "BEHAVIOR_PANIC".to_string())));
    assert!(codes.contains(&(broken, "BEHAVIOR_INVALID_HEALTH".to_string())));
    assert_eq!(manager.metrics().faults(), 2);
}

#[test]
fn sweep_keeps_only_valid_creatures() {
    let mut manager = manager();
    let mut world = MockWorld::new();
    let alive = spawn(&mut manager, &mut world, VariantKind::Walker, ORIGIN);
    let dead = spawn(&mut manager, &mut world, VariantKind::Crawler, at(2.0));
    let unloaded = spawn(&mut manager, &mut world, VariantKind::Mummy, at(4.0));

    world.kill(dead);
    world.remove_creature(unloaded);

    assert_eq!(manager.sweep(Tick(600), &mut world), 2);
    assert_eq!(manager.ids().collect::<Vec<_>>(), vec![alive]);
    assert_eq!(manager.stats().active, 1);
    assert_eq!(manager.stats().removed, 2);
    assert_eq!(manager.sweep(Tick(1200), &mut world), 0);
    assert!(!manager.contains(dead));
}

#[test]
fn invalid_creatures_leave_during_pass() {
    let mut manager = manager();
    let mut world = MockWorld::new();
    let id = spawn(&mut manager, &mut world, VariantKind::Walker, ORIGIN);
    world.remove_creature(id);

    let report = manager.tick_all(Tick(5), &mut world);
    assert_eq!(report.removed, 1);
    assert!(manager.is_empty());
    assert!(manager.drain_events().contains(&BehaviorEvent::Removed {
        creature: id,
        reason: RemovalReason::Invalid
    }));
}

#[test]
fn advance_follows_cadence() {
    let mut manager = manager();
    let mut world = MockWorld::new();
    spawn(&mut manager, &mut world, VariantKind::Walker, ORIGIN);

    assert!(manager.advance(Tick(4), &mut world).pass.is_none());
    let report = manager.advance(Tick(5), &mut world);
    assert_eq!(report.pass.map(|p| p.ticked), Some(1));
    assert!(report.swept.is_none());
    assert_eq!(manager.advance(Tick(600), &mut world).swept, Some(0));
}

#[test]
fn force_stop_closes_bar_without_victory() {
    let mut manager = manager();
    let mut world = MockWorld::new();
    let boss = spawn(&mut manager, &mut world, VariantKind::Butcher, ORIGIN);
    world.add_player(at(10.0));
    manager.tick_all(Tick(1), &mut world);

    assert!(manager.remove(Tick(2), &mut world, boss));
    assert!(!manager.remove(Tick(3), &mut world, boss));

    assert_eq!(world.encounter_updates(boss).last(), Some(&&EncounterUpdate::Close));
    assert_eq!(
        world.count(|call| matches!(call, EffectCall::Fx { kind: FxKind::Victory, .. })),
        0
    );
}

#[test]
fn stale_deferred_owner_is_dropped() {
    let mut manager = manager();
    let mut world = MockWorld::new();
    let boss = spawn(&mut manager, &mut world, VariantKind::Gravedigger, ORIGIN);
    world.add_player(at(5.0));
    manager.tick_all(Tick(1), &mut world);
    assert_eq!(manager.pending_deferred(), 2);

    world.kill(boss);
    manager.run_deferred(Tick(21), &mut world);

    let snapshot = manager.metrics().snapshot();
    assert_eq!(snapshot.deferred_dropped, 2);
    assert_eq!(snapshot.faults, 0);
}

#[test]
fn duplicate_registration_keeps_first_instance() {
    let mut manager = manager();
    let mut world = MockWorld::new();
    let id = spawn(&mut manager, &mut world, VariantKind::Walker, ORIGIN);
    manager.register(id, Variant::of(VariantKind::Walker), 30, ORIGIN);

    assert_eq!(manager.len(), 1);
    assert_eq!(manager.get(id).unwrap().level(), 10);
    assert_eq!(manager.stats().created, 1);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "unrecognised variant")]
fn mismatched_variant_panics_in_debug() {
    let mut manager = manager();
    manager.register(
        CreatureId(1),
        Variant::new(Category::Basic, VariantKind::Butcher),
        1,
        ORIGIN,
    );
}

#[test]
#[cfg(not(debug_assertions))]
fn mismatched_variant_is_skipped_in_release() {
    let mut manager = manager();
    let registered = manager.register(
        CreatureId(1),
        Variant::new(Category::Basic, VariantKind::Butcher),
        1,
        ORIGIN,
    );
    assert!(registered.is_none());
    assert!(manager.is_empty());
}

#[test]
fn raise_dead_recovers_once_minions_die() {
    let mut manager = manager();
    let mut world = MockWorld::new();
    let boss = spawn(&mut manager, &mut world, VariantKind::Gravedigger, ORIGIN);
    world.add_player(at(5.0));

    let raised = summon_now(&mut manager, &mut world, boss, 6, MinionPool::Skeletons);
    assert_eq!(raised.len(), 6);
    assert_eq!(manager.get(boss).unwrap().core().minions.remaining_capacity(), 0);
    for minion in &raised {
        world.kill(*minion);
    }

    // Phase 2 unlocks raise dead; the transition locks abilities for 60 ticks.
    world.set_health(boss, 10.0);
    manager.tick_all(Tick(2), &mut world);
    assert_eq!(manager.get(boss).unwrap().phase(), 2);
    assert!(manager.get(boss).unwrap().core().minions.is_empty());
    manager.drain_events();

    manager.tick_all(Tick(100), &mut world);
    assert!(manager.drain_events().contains(&BehaviorEvent::CommitStarted {
        creature: boss,
        ability: Ability::RaiseDead,
        until: Tick(120),
    }));

    manager.run_deferred(Tick(120), &mut world);
    assert_eq!(summoned(&manager.drain_events()), vec![(3, 3)]);
    assert_eq!(manager.get(boss).unwrap().core().minions.len(), 3);
}

#[test]
fn masterless_fury_only_reaches_live_minions() {
    let mut manager = manager();
    let mut world = MockWorld::new();
    let necromancer = spawn(&mut manager, &mut world, VariantKind::Necromancer, ORIGIN);
    let minions = summon_now(&mut manager, &mut world, necromancer, 2, MinionPool::Undead);
    assert_eq!(minions.len(), 2);
    let (fallen, standing) = (minions[0], minions[1]);

    world.kill(fallen);
    world.take_calls();
    world.kill(necromancer);
    manager.dispatch_death(Tick(2), &mut world, necromancer, None);

    assert_eq!(
        statuses_on(&world, standing),
        vec![
            StatusEffect::new(StatusKind::Strength, 200, 2),
            StatusEffect::new(StatusKind::Wither, 200, 0),
        ]
    );
    assert!(statuses_on(&world, fallen).is_empty());
    assert!(!manager.contains(necromancer));
}

#[test]
fn damage_can_break_the_ritual() {
    let mut manager = manager();
    let mut world = MockWorld::new();
    let necromancer = spawn(&mut manager, &mut world, VariantKind::Necromancer, ORIGIN);
    let player = world.add_player(at(10.0));
    world.set_health(necromancer, 6.0);

    manager.tick_all(Tick(1), &mut world);
    assert!(
        manager
            .get(necromancer)
            .unwrap()
            .flags()
            .contains(BehaviorFlags::CHANNELING)
    );

    // Rolls always succeed under StepRng, so the first hit interrupts.
    manager.dispatch_damaged(Tick(2), &mut world, necromancer, Some(EntityRef::Player(player)), 2.0);
    assert!(
        !manager
            .get(necromancer)
            .unwrap()
            .flags()
            .contains(BehaviorFlags::CHANNELING)
    );
    assert_eq!(
        world.count(|call| matches!(call, EffectCall::Fx { kind: FxKind::ChannelBroken, .. })),
        1
    );

    manager.tick_all(Tick(101), &mut world);
    let events = manager.drain_events();
    assert!(events.contains(&BehaviorEvent::RitualInterrupted {
        creature: necromancer
    }));
    assert!(!events.contains(&BehaviorEvent::RitualCompleted {
        creature: necromancer
    }));
    assert_eq!(
        world.count(|call| matches!(call, EffectCall::Heal { creature, .. } if *creature == necromancer)),
        0
    );
}

#[test]
fn finished_ritual_heals_and_raises_shadows() {
    let mut manager = manager();
    let mut world = MockWorld::new();
    let necromancer = spawn(&mut manager, &mut world, VariantKind::Necromancer, ORIGIN);
    world.add_player(at(10.0));
    world.set_health(necromancer, 6.0);

    manager.tick_all(Tick(1), &mut world);
    manager.tick_all(Tick(50), &mut world);
    assert_eq!(
        world.count(|call| matches!(call, EffectCall::Spawned { .. })),
        0
    );
    manager.drain_events();

    manager.tick_all(Tick(101), &mut world);

    let healed: f32 = world
        .calls()
        .iter()
        .filter_map(|call| match call {
            EffectCall::Heal { creature, amount } if *creature == necromancer => Some(*amount),
            _ => None,
        })
        .sum();
    assert!((healed - 8.0).abs() < 1e-4);
    let shadows = world.count(|call| {
        matches!(call, EffectCall::Spawned { variant, .. } if variant.kind == VariantKind::Shadow)
    });
    assert_eq!(shadows, 2);

    let events = manager.drain_events();
    assert!(events.contains(&BehaviorEvent::RitualCompleted {
        creature: necromancer
    }));
    assert_eq!(summoned(&events), vec![(2, 2)]);
}

#[test]
fn summoner_winds_up_before_raising_minions() {
    let mut manager = manager();
    let mut world = MockWorld::new();
    let necromancer = spawn(&mut manager, &mut world, VariantKind::Necromancer, ORIGIN);
    let player = world.add_player(at(10.0));

    manager.tick_all(Tick(1), &mut world);
    assert!(manager.drain_events().contains(&BehaviorEvent::CommitStarted {
        creature: necromancer,
        ability: Ability::Summon,
        until: Tick(41),
    }));
    assert_eq!(
        manager.get(necromancer).unwrap().flags(),
        BehaviorFlags::COMMITTING
    );

    assert_eq!(manager.run_deferred(Tick(40), &mut world), 0);
    assert_eq!(
        world.count(|call| matches!(call, EffectCall::Spawned { .. })),
        0
    );

    assert_eq!(manager.run_deferred(Tick(41), &mut world), 2);
    assert_eq!(summoned(&manager.drain_events()), vec![(3, 3)]);

    let instance = manager.get(necromancer).unwrap();
    assert!(instance.flags().is_empty());
    let minions: Vec<CreatureId> = instance.core().minions.iter().collect();
    assert_eq!(minions.len(), 3);
    for minion in minions {
        assert!(world.calls().contains(&EffectCall::SetTarget {
            creature: minion,
            target: Some(player),
        }));
    }
}

#[test]
fn pack_bonus_tracks_deaths_and_strays() {
    let mut manager = manager();
    let mut world = MockWorld::new();
    let leader = spawn(&mut manager, &mut world, VariantKind::RabidWolf, ORIGIN);
    let stray = spawn(&mut manager, &mut world, VariantKind::RabidWolf, at(2.0));
    let doomed = spawn(&mut manager, &mut world, VariantKind::RabidWolf, at(4.0));

    manager.tick_all(Tick(1), &mut world);
    assert_eq!(pack_bonus(&manager, leader), 2);

    world.kill(doomed);
    manager.tick_all(Tick(21), &mut world);
    assert!(!manager.contains(doomed));
    assert_eq!(pack_bonus(&manager, leader), 1);

    // Not recomputed until the refresh interval has passed again.
    world.move_creature(stray, at(40.0));
    manager.tick_all(Tick(30), &mut world);
    assert_eq!(pack_bonus(&manager, leader), 1);

    manager.tick_all(Tick(41), &mut world);
    assert_eq!(pack_bonus(&manager, leader), 0);
    assert_eq!(pack_bonus(&manager, stray), 0);
}

#[test]
fn cleave_lands_immediately_within_four_blocks() {
    let mut manager = manager();
    let mut world = MockWorld::new();
    let boss = spawn(&mut manager, &mut world, VariantKind::Butcher, ORIGIN);
    let close = world.add_player(at(3.0));
    let outside = world.add_player(at(4.5));

    manager.tick_all(Tick(1), &mut world);

    assert_eq!(world.damage_to(EntityRef::Player(close)), 20.0);
    assert_eq!(world.damage_to(EntityRef::Player(outside)), 0.0);
    assert!(world.calls().contains(&EffectCall::Status {
        target: EntityRef::Player(close),
        effect: StatusEffect::new(StatusKind::Slowness, 40, 1),
    }));
    assert!(!manager.get(boss).unwrap().flags().contains(BehaviorFlags::COMMITTING));
    assert_eq!(manager.pending_deferred(), 0);
    assert!(manager.drain_events().contains(&BehaviorEvent::AbilityUsed {
        creature: boss,
        ability: Ability::Cleave,
    }));
}

#[test]
fn shield_bash_hits_within_two_blocks_after_windup() {
    let mut manager = manager();
    let mut world = MockWorld::new();
    let elite = spawn(&mut manager, &mut world, VariantKind::ArmoredElite, ORIGIN);
    let near = world.add_player(at(1.5));
    let beyond = world.add_player(at(2.5));

    manager.tick_all(Tick(1), &mut world);
    assert!(manager.drain_events().contains(&BehaviorEvent::CommitStarted {
        creature: elite,
        ability: Ability::ShieldBash,
        until: Tick(11),
    }));
    assert_eq!(world.damage_to(EntityRef::Player(near)), 0.0);

    manager.run_deferred(Tick(11), &mut world);
    assert_eq!(world.damage_to(EntityRef::Player(near)), 11.0);
    assert_eq!(world.damage_to(EntityRef::Player(beyond)), 0.0);
}
