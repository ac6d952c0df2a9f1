//! Flat in-memory arena implementing the engine's host traits.
//!
//! The runtime worker and the player simulation share one [`ArenaWorld`];
//! every trait call takes the lock for its own duration only.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use behavior_core::{
    Announcement, Attribute, CreatureId, CreatureSnapshot, EffectSink, EncounterUpdate, EntityRef,
    FxKind, Location, PlayerId, PlayerSnapshot, Radii, Spawner, StatusEffect, Variant,
    VariantKind, Vec3, WorldOracle,
};
use rand::Rng;
use rand::RngCore;
use tracing::{debug, info, trace};

pub const GROUND_Y: f64 = 64.0;
const ARENA_RADIUS: f64 = 40.0;
const PLAYER_HEALTH: f32 = 20.0;

/// Initial population, cycled when more creatures are requested.
const ROSTER: [VariantKind; 10] = [
    VariantKind::Walker,
    VariantKind::Runner,
    VariantKind::Crawler,
    VariantKind::RabidWolf,
    VariantKind::Shambler,
    VariantKind::RabidWolf,
    VariantKind::Mummy,
    VariantKind::ArmoredElite,
    VariantKind::Necromancer,
    VariantKind::Gravedigger,
];

/// A creature the host created and the runtime has not heard about yet.
#[derive(Clone, Copy, Debug)]
pub struct PendingSpawn {
    pub creature: CreatureId,
    pub variant: Variant,
    pub level: u32,
    pub at: Location,
}

#[derive(Debug, Default)]
struct Arena {
    creatures: BTreeMap<CreatureId, CreatureSnapshot>,
    players: BTreeMap<PlayerId, PlayerSnapshot>,
    targets: BTreeMap<CreatureId, PlayerId>,
    pending: Vec<PendingSpawn>,
    next_creature: u64,
    player_deaths: u64,
}

impl Arena {
    fn insert_creature(&mut self, variant: Variant, level: u32, at: Location) -> CreatureId {
        self.next_creature += 1;
        let id = CreatureId(self.next_creature);
        let max_health = max_health_for(variant.kind, level);
        self.creatures.insert(
            id,
            CreatureSnapshot {
                id,
                variant,
                position: at,
                health: max_health,
                max_health,
                alive: true,
            },
        );
        self.pending.push(PendingSpawn {
            creature: id,
            variant,
            level,
            at,
        });
        id
    }

    fn move_entity(&mut self, target: EntityRef, by: Vec3) {
        match target {
            EntityRef::Creature(id) => {
                if let Some(creature) = self.creatures.get_mut(&id) {
                    creature.position = creature.position.offset(by);
                }
            }
            EntityRef::Player(id) => {
                if let Some(player) = self.players.get_mut(&id) {
                    player.position = player.position.offset(by);
                }
            }
        }
    }
}

fn max_health_for(kind: VariantKind, level: u32) -> f32 {
    let base = if kind.category().is_boss() {
        300.0
    } else {
        match kind {
            VariantKind::ArmoredElite | VariantKind::Necromancer => 60.0,
            VariantKind::RabidWolf | VariantKind::Runner => 16.0,
            _ => 20.0,
        }
    };
    base * (1.0 + level as f32 * 0.05)
}

fn ring_position(rng: &mut dyn RngCore, radius: f64) -> Location {
    let angle = rng.gen_range(0.0..std::f64::consts::TAU);
    let distance = rng.gen_range(0.0..radius);
    Location::new(angle.cos() * distance, GROUND_Y, angle.sin() * distance)
}

/// Shared handle to the arena.
#[derive(Clone, Debug, Default)]
pub struct ArenaWorld {
    inner: Arc<Mutex<Arena>>,
}

impl ArenaWorld {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Arena> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Places `count` creatures and `players` players; the creatures come
    /// back through [`take_pending`](Self::take_pending).
    pub fn populate(&self, rng: &mut dyn RngCore, count: usize, players: usize) {
        let mut arena = self.lock();
        for i in 0..players {
            let id = PlayerId(i as u64 + 1);
            arena.players.insert(
                id,
                PlayerSnapshot {
                    id,
                    position: ring_position(rng, 8.0),
                    health: PLAYER_HEALTH,
                    max_health: PLAYER_HEALTH,
                    online: true,
                    alive: true,
                    targetable: true,
                },
            );
        }
        for kind in ROSTER.iter().cycle().take(count) {
            let at = ring_position(rng, ARENA_RADIUS);
            let level = rng.gen_range(1..=20);
            arena.insert_creature(Variant::of(*kind), level, at);
        }
    }

    pub fn take_pending(&self) -> Vec<PendingSpawn> {
        std::mem::take(&mut self.lock().pending)
    }

    pub fn players(&self) -> Vec<PlayerSnapshot> {
        self.lock().players.values().cloned().collect()
    }

    pub fn creature_count(&self) -> usize {
        self.lock().creatures.len()
    }

    pub fn player_deaths(&self) -> u64 {
        self.lock().player_deaths
    }

    /// Creatures whose current target is `player` and that stand within
    /// `reach` of them.
    pub fn attackers_of(&self, player: &PlayerSnapshot, reach: f64) -> Vec<CreatureId> {
        let arena = self.lock();
        arena
            .targets
            .iter()
            .filter(|(_, target)| **target == player.id)
            .filter_map(|(id, _)| arena.creatures.get(id))
            .filter(|c| c.alive && c.position.distance(&player.position) <= reach)
            .map(|c| c.id)
            .collect()
    }

    /// Closest living creature to `player`.
    pub fn closest_creature(&self, player: &PlayerSnapshot) -> Option<CreatureSnapshot> {
        self.lock()
            .creatures
            .values()
            .filter(|c| c.alive)
            .min_by(|a, b| {
                let da = a.position.distance_squared(&player.position);
                let db = b.position.distance_squared(&player.position);
                da.total_cmp(&db)
            })
            .cloned()
    }

    /// Moves a player up to `step` blocks towards `to`.
    pub fn walk_player(&self, player: PlayerId, to: Location, step: f64) {
        let mut arena = self.lock();
        if let Some(p) = arena.players.get_mut(&player) {
            let distance = p.position.distance(&to);
            if distance > f64::EPSILON {
                let t = (step / distance).min(1.0);
                p.position = Location::new(
                    p.position.x + (to.x - p.position.x) * t,
                    GROUND_Y,
                    p.position.z + (to.z - p.position.z) * t,
                );
            }
        }
    }

    /// A player hits a creature. Returns the health left, `None` when the
    /// creature is gone.
    pub fn strike(&self, creature: CreatureId, amount: f32) -> Option<f32> {
        let mut arena = self.lock();
        let snapshot = arena.creatures.get_mut(&creature)?;
        snapshot.health = (snapshot.health - amount).max(0.0);
        if snapshot.health <= 0.0 {
            snapshot.alive = false;
        }
        Some(snapshot.health)
    }

    /// Removes a dead creature after its death notification went out.
    pub fn bury(&self, creature: CreatureId) {
        let mut arena = self.lock();
        arena.creatures.remove(&creature);
        arena.targets.remove(&creature);
    }
}

impl WorldOracle for ArenaWorld {
    fn creature(&self, id: CreatureId) -> Option<CreatureSnapshot> {
        self.lock().creatures.get(&id).cloned()
    }

    fn player(&self, id: PlayerId) -> Option<PlayerSnapshot> {
        self.lock().players.get(&id).cloned()
    }

    fn nearest_player(&self, origin: Location, radius: f64) -> Option<PlayerSnapshot> {
        let radius_sq = radius * radius;
        self.lock()
            .players
            .values()
            .filter(|p| p.is_valid_target())
            .map(|p| (p.position.distance_squared(&origin), p))
            .filter(|(distance, _)| *distance <= radius_sq)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, p)| p.clone())
    }

    fn nearby_players(&self, origin: Location, radii: Radii) -> Vec<PlayerSnapshot> {
        self.lock()
            .players
            .values()
            .filter(|p| radii.contains(&origin, &p.position))
            .cloned()
            .collect()
    }

    fn nearby_creatures(&self, origin: Location, radii: Radii) -> Vec<CreatureSnapshot> {
        self.lock()
            .creatures
            .values()
            .filter(|c| radii.contains(&origin, &c.position))
            .cloned()
            .collect()
    }

    fn ground_location(&self, candidate: Location, depth: f64) -> Option<Location> {
        let within_arena = candidate.x.hypot(candidate.z) <= ARENA_RADIUS;
        let reachable = candidate.y >= GROUND_Y && candidate.y - GROUND_Y <= depth;
        (within_arena && reachable).then(|| Location::new(candidate.x, GROUND_Y, candidate.z))
    }
}

impl EffectSink for ArenaWorld {
    fn apply_status(&mut self, target: EntityRef, effect: StatusEffect) {
        trace!(target: "harness::arena", ?target, ?effect, "status");
    }

    fn play_effect(&mut self, kind: FxKind, location: Location) {
        trace!(target: "harness::arena", ?kind, %location, "fx");
    }

    fn damage(&mut self, target: EntityRef, amount: f32, source: CreatureId) {
        let EntityRef::Player(id) = target else {
            return;
        };
        let mut arena = self.lock();
        let Some(player) = arena.players.get_mut(&id) else {
            return;
        };
        player.health = (player.health - amount).max(0.0);
        if player.health > 0.0 {
            return;
        }
        // Players respawn in place at full health.
        player.health = player.max_health;
        arena.player_deaths += 1;
        info!(target: "harness::arena", player = %id, killer = %source, "player slain");
    }

    fn heal(&mut self, creature: CreatureId, amount: f32) {
        if let Some(snapshot) = self.lock().creatures.get_mut(&creature) {
            snapshot.health = (snapshot.health + amount).min(snapshot.max_health);
        }
    }

    fn knockback(&mut self, target: EntityRef, velocity: Vec3) {
        self.lock().move_entity(target, velocity);
    }

    fn teleport(&mut self, creature: CreatureId, location: Location) {
        if let Some(snapshot) = self.lock().creatures.get_mut(&creature) {
            snapshot.position = location;
        }
    }

    fn set_target(&mut self, creature: CreatureId, target: Option<PlayerId>) {
        let mut arena = self.lock();
        match target {
            Some(player) => arena.targets.insert(creature, player),
            None => arena.targets.remove(&creature),
        };
    }

    fn scale_attribute(&mut self, creature: CreatureId, attribute: Attribute, factor: f32) {
        debug!(target: "harness::arena", %creature, ?attribute, factor, "attribute scaled");
    }

    fn announce(&mut self, players: &[PlayerId], announcement: &Announcement) {
        info!(
            target: "harness::arena",
            audience = players.len(),
            title = %announcement.title,
            subtitle = %announcement.subtitle,
            "announcement"
        );
    }

    fn encounter(&mut self, boss: CreatureId, update: EncounterUpdate) {
        match update {
            EncounterUpdate::Progress(bar) => {
                trace!(target: "harness::arena", %boss, label = %bar.label(), progress = bar.progress, "bar");
            }
            other => debug!(target: "harness::arena", %boss, ?other, "encounter update"),
        }
    }
}

impl Spawner for ArenaWorld {
    fn spawn_creature(
        &mut self,
        variant: Variant,
        level: u32,
        location: Location,
    ) -> Option<CreatureId> {
        Some(self.lock().insert_creature(variant, level, location))
    }

    fn despawn(&mut self, creature: CreatureId) {
        let mut arena = self.lock();
        arena.creatures.remove(&creature);
        arena.targets.remove(&creature);
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn populate_queues_every_creature() {
        let world = ArenaWorld::new();
        let mut rng = StdRng::seed_from_u64(3);
        world.populate(&mut rng, 12, 2);

        assert_eq!(world.creature_count(), 12);
        assert_eq!(world.players().len(), 2);
        let pending = world.take_pending();
        assert_eq!(pending.len(), 12);
        assert!(pending.iter().all(|p| p.variant.is_consistent()));
        assert!(world.take_pending().is_empty());
    }

    #[test]
    fn ground_is_flat_inside_the_arena() {
        let world = ArenaWorld::new();
        assert_eq!(
            world.ground_location(Location::new(1.0, 70.0, 1.0), 8.0),
            Some(Location::new(1.0, GROUND_Y, 1.0))
        );
        assert_eq!(world.ground_location(Location::new(1.0, 80.0, 1.0), 8.0), None);
        assert_eq!(world.ground_location(Location::new(90.0, 64.0, 0.0), 8.0), None);
    }

    #[test]
    fn lethal_strike_marks_creature_dead() {
        let mut world = ArenaWorld::new();
        let id = world
            .spawn_creature(Variant::of(VariantKind::Walker), 1, Location::new(0.0, GROUND_Y, 0.0))
            .unwrap();

        assert!(world.strike(id, 5.0).unwrap() > 0.0);
        assert_eq!(world.strike(id, 100.0), Some(0.0));
        assert!(!world.is_creature_valid(id));
        world.bury(id);
        assert_eq!(world.strike(id, 1.0), None);
    }
}
