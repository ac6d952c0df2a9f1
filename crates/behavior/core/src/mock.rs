//! In-memory [`World`](crate::env::World) recording every effect request.
//!
//! Available in this crate's tests and, through the `mock` feature, to
//! downstream crates.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};

use crate::env::{
    Announcement, Attribute, CreatureSnapshot, EffectSink, EncounterUpdate, FxKind,
    PlayerSnapshot, Radii, Spawner, StatusEffect, WorldOracle,
};
use crate::types::{CreatureId, EntityRef, Location, PlayerId, Vec3};
use crate::variant::Variant;

const DEFAULT_MAX_HEALTH: f32 = 20.0;

/// One effect request, as received.
#[derive(Clone, Debug, PartialEq)]
pub enum EffectCall {
    Status {
        target: EntityRef,
        effect: StatusEffect,
    },
    Fx {
        kind: FxKind,
        at: Location,
    },
    Damage {
        target: EntityRef,
        amount: f32,
        source: CreatureId,
    },
    Heal {
        creature: CreatureId,
        amount: f32,
    },
    Knockback {
        target: EntityRef,
        velocity: Vec3,
    },
    Teleport {
        creature: CreatureId,
        to: Location,
    },
    SetTarget {
        creature: CreatureId,
        target: Option<PlayerId>,
    },
    Attribute {
        creature: CreatureId,
        attribute: Attribute,
        factor: f32,
    },
    Announce {
        players: Vec<PlayerId>,
        announcement: Announcement,
    },
    Encounter {
        boss: CreatureId,
        update: EncounterUpdate,
    },
    Spawned {
        creature: CreatureId,
        variant: Variant,
        level: u32,
        at: Location,
    },
    Despawned(CreatureId),
}

/// Test world.
///
/// Ground queries answer from a script first; once the script is exhausted
/// every candidate is standable unless solid ground was switched off.
#[derive(Debug)]
pub struct MockWorld {
    creatures: BTreeMap<CreatureId, CreatureSnapshot>,
    players: BTreeMap<PlayerId, PlayerSnapshot>,
    ground_script: RefCell<VecDeque<Option<Location>>>,
    solid_ground: bool,
    next_creature: u64,
    next_player: u64,
    panic_at: Option<Location>,
    calls: Vec<EffectCall>,
}

impl Default for MockWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWorld {
    pub fn new() -> Self {
        Self {
            creatures: BTreeMap::new(),
            players: BTreeMap::new(),
            ground_script: RefCell::new(VecDeque::new()),
            solid_ground: true,
            next_creature: 1,
            next_player: 1,
            panic_at: None,
            calls: Vec::new(),
        }
    }

    /// Adds a full-health creature and returns its id.
    pub fn add_creature(&mut self, variant: Variant, position: Location) -> CreatureId {
        self.add_creature_with_health(variant, position, DEFAULT_MAX_HEALTH, DEFAULT_MAX_HEALTH)
    }

    pub fn add_creature_with_health(
        &mut self,
        variant: Variant,
        position: Location,
        health: f32,
        max_health: f32,
    ) -> CreatureId {
        let id = CreatureId(self.next_creature);
        self.next_creature += 1;
        self.creatures.insert(
            id,
            CreatureSnapshot {
                id,
                variant,
                position,
                health,
                max_health,
                alive: true,
            },
        );
        id
    }

    /// Adds an online, alive, targetable player and returns its id.
    pub fn add_player(&mut self, position: Location) -> PlayerId {
        let id = PlayerId(self.next_player);
        self.next_player += 1;
        self.players.insert(
            id,
            PlayerSnapshot {
                id,
                position,
                health: 20.0,
                max_health: 20.0,
                online: true,
                alive: true,
                targetable: true,
            },
        );
        id
    }

    pub fn creature_mut(&mut self, id: CreatureId) -> Option<&mut CreatureSnapshot> {
        self.creatures.get_mut(&id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerSnapshot> {
        self.players.get_mut(&id)
    }

    pub fn set_health(&mut self, id: CreatureId, health: f32) {
        if let Some(creature) = self.creatures.get_mut(&id) {
            creature.health = health;
        }
    }

    pub fn move_creature(&mut self, id: CreatureId, position: Location) {
        if let Some(creature) = self.creatures.get_mut(&id) {
            creature.position = position;
        }
    }

    pub fn move_player(&mut self, id: PlayerId, position: Location) {
        if let Some(player) = self.players.get_mut(&id) {
            player.position = position;
        }
    }

    /// Marks the creature dead without removing it.
    pub fn kill(&mut self, id: CreatureId) {
        if let Some(creature) = self.creatures.get_mut(&id) {
            creature.alive = false;
            creature.health = 0.0;
        }
    }

    /// Removes the creature silently, as an unload would.
    pub fn remove_creature(&mut self, id: CreatureId) -> Option<CreatureSnapshot> {
        self.creatures.remove(&id)
    }

    pub fn set_solid_ground(&mut self, solid: bool) {
        self.solid_ground = solid;
    }

    /// Queues answers for the next ground queries.
    pub fn script_ground(&mut self, answers: impl IntoIterator<Item = Option<Location>>) {
        self.ground_script.get_mut().extend(answers);
    }

    /// Makes any nearest-player search starting exactly at `origin` panic.
    pub fn panic_when_searching_from(&mut self, origin: Location) {
        self.panic_at = Some(origin);
    }

    pub fn creature_count(&self) -> usize {
        self.creatures.len()
    }

    pub fn calls(&self) -> &[EffectCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<EffectCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn count(&self, predicate: impl Fn(&EffectCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    /// Total damage requested against `target`.
    pub fn damage_to(&self, target: EntityRef) -> f32 {
        self.calls
            .iter()
            .filter_map(|call| match call {
                EffectCall::Damage {
                    target: hit,
                    amount,
                    ..
                } if *hit == target => Some(*amount),
                _ => None,
            })
            .sum()
    }

    pub fn encounter_updates(&self, boss: CreatureId) -> Vec<&EncounterUpdate> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                EffectCall::Encounter { boss: id, update } if *id == boss => Some(update),
                _ => None,
            })
            .collect()
    }
}

impl WorldOracle for MockWorld {
    fn creature(&self, id: CreatureId) -> Option<CreatureSnapshot> {
        self.creatures.get(&id).cloned()
    }

    fn player(&self, id: PlayerId) -> Option<PlayerSnapshot> {
        self.players.get(&id).cloned()
    }

    fn nearest_player(&self, origin: Location, radius: f64) -> Option<PlayerSnapshot> {
        if self.panic_at == Some(origin) {
            panic!("scripted failure searching from {origin}");
        }
        let radius_sq = radius * radius;
        self.players
            .values()
            .filter(|p| p.is_valid_target())
            .map(|p| (p.position.distance_squared(&origin), p))
            .filter(|(distance, _)| *distance <= radius_sq)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, p)| p.clone())
    }

    fn nearby_players(&self, origin: Location, radii: Radii) -> Vec<PlayerSnapshot> {
        self.players
            .values()
            .filter(|p| radii.contains(&origin, &p.position))
            .cloned()
            .collect()
    }

    fn nearby_creatures(&self, origin: Location, radii: Radii) -> Vec<CreatureSnapshot> {
        self.creatures
            .values()
            .filter(|c| radii.contains(&origin, &c.position))
            .cloned()
            .collect()
    }

    fn ground_location(&self, candidate: Location, _depth: f64) -> Option<Location> {
        match self.ground_script.borrow_mut().pop_front() {
            Some(answer) => answer,
            None => self.solid_ground.then_some(candidate),
        }
    }
}

impl EffectSink for MockWorld {
    fn apply_status(&mut self, target: EntityRef, effect: StatusEffect) {
        self.calls.push(EffectCall::Status { target, effect });
    }

    fn play_effect(&mut self, kind: FxKind, location: Location) {
        self.calls.push(EffectCall::Fx { kind, at: location });
    }

    fn damage(&mut self, target: EntityRef, amount: f32, source: CreatureId) {
        if let EntityRef::Player(id) = target
            && let Some(player) = self.players.get_mut(&id)
        {
            player.health = (player.health - amount).max(0.0);
        }
        self.calls.push(EffectCall::Damage {
            target,
            amount,
            source,
        });
    }

    fn heal(&mut self, creature: CreatureId, amount: f32) {
        if let Some(snapshot) = self.creatures.get_mut(&creature) {
            snapshot.health = (snapshot.health + amount).min(snapshot.max_health);
        }
        self.calls.push(EffectCall::Heal { creature, amount });
    }

    fn knockback(&mut self, target: EntityRef, velocity: Vec3) {
        self.calls.push(EffectCall::Knockback { target, velocity });
    }

    fn teleport(&mut self, creature: CreatureId, location: Location) {
        self.move_creature(creature, location);
        self.calls.push(EffectCall::Teleport {
            creature,
            to: location,
        });
    }

    fn set_target(&mut self, creature: CreatureId, target: Option<PlayerId>) {
        self.calls.push(EffectCall::SetTarget { creature, target });
    }

    fn scale_attribute(&mut self, creature: CreatureId, attribute: Attribute, factor: f32) {
        self.calls.push(EffectCall::Attribute {
            creature,
            attribute,
            factor,
        });
    }

    fn announce(&mut self, players: &[PlayerId], announcement: &Announcement) {
        self.calls.push(EffectCall::Announce {
            players: players.to_vec(),
            announcement: announcement.clone(),
        });
    }

    fn encounter(&mut self, boss: CreatureId, update: EncounterUpdate) {
        self.calls.push(EffectCall::Encounter { boss, update });
    }
}

impl Spawner for MockWorld {
    fn spawn_creature(
        &mut self,
        variant: Variant,
        level: u32,
        location: Location,
    ) -> Option<CreatureId> {
        let id = self.add_creature(variant, location);
        self.calls.push(EffectCall::Spawned {
            creature: id,
            variant,
            level,
            at: location,
        });
        Some(id)
    }

    fn despawn(&mut self, creature: CreatureId) {
        self.creatures.remove(&creature);
        self.calls.push(EffectCall::Despawned(creature));
    }
}
