//! Traits describing the world the engine runs against.
//!
//! The engine never owns creatures, players or terrain. It reads them through
//! [`WorldOracle`], requests changes through [`EffectSink`] and creates new
//! creatures through [`Spawner`]. Effect requests are fire-and-forget: the
//! world may drop any of them and the engine carries on.
mod effects;

pub use effects::{
    Announcement, Attribute, EncounterBar, EncounterUpdate, FxKind, StatusEffect, StatusKind,
};

use crate::types::{CreatureId, EntityRef, Location, PlayerId, Vec3};
use crate::variant::Variant;

/// Point-in-time view of a creature.
#[derive(Clone, Debug, PartialEq)]
pub struct CreatureSnapshot {
    pub id: CreatureId,
    pub variant: Variant,
    pub position: Location,
    pub health: f32,
    pub max_health: f32,
    pub alive: bool,
}

impl CreatureSnapshot {
    /// Health as a fraction of max health, clamped to `[0, 1]`.
    pub fn health_ratio(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }
}

/// Point-in-time view of a player.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub position: Location,
    pub health: f32,
    pub max_health: f32,
    pub online: bool,
    pub alive: bool,
    /// Spectators and other non-combat modes.
    pub targetable: bool,
}

impl PlayerSnapshot {
    /// Online, alive and in a mode creatures may fight.
    pub fn is_valid_target(&self) -> bool {
        self.online && self.alive && self.targetable
    }

    pub fn health_ratio(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }
}

/// Axis-aligned search box half extents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Radii {
    pub horizontal: f64,
    pub vertical: f64,
}

impl Radii {
    pub const fn new(horizontal: f64, vertical: f64) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Same extent on every axis.
    pub const fn cube(radius: f64) -> Self {
        Self::new(radius, radius)
    }

    pub fn contains(&self, origin: &Location, point: &Location) -> bool {
        (point.x - origin.x).abs() <= self.horizontal
            && (point.z - origin.z).abs() <= self.horizontal
            && (point.y - origin.y).abs() <= self.vertical
    }
}

/// Read-only queries against world state.
pub trait WorldOracle {
    fn creature(&self, id: CreatureId) -> Option<CreatureSnapshot>;

    fn player(&self, id: PlayerId) -> Option<PlayerSnapshot>;

    /// Closest valid target within `radius` of `origin`.
    fn nearest_player(&self, origin: Location, radius: f64) -> Option<PlayerSnapshot>;

    fn nearby_players(&self, origin: Location, radii: Radii) -> Vec<PlayerSnapshot>;

    fn nearby_creatures(&self, origin: Location, radii: Radii) -> Vec<CreatureSnapshot>;

    /// Standing position on solid ground at or below `candidate`, searching
    /// at most `depth` blocks down. `None` when nothing suitable exists.
    fn ground_location(&self, candidate: Location, depth: f64) -> Option<Location>;

    /// True when the creature exists and is alive.
    fn is_creature_valid(&self, id: CreatureId) -> bool {
        self.creature(id).is_some_and(|c| c.alive)
    }

    /// Player snapshot, filtered to valid targets.
    fn valid_player(&self, id: PlayerId) -> Option<PlayerSnapshot> {
        self.player(id).filter(PlayerSnapshot::is_valid_target)
    }
}

/// Effect requests. Implementations must not panic on stale ids.
pub trait EffectSink {
    fn apply_status(&mut self, target: EntityRef, effect: StatusEffect);

    fn play_effect(&mut self, kind: FxKind, location: Location);

    fn damage(&mut self, target: EntityRef, amount: f32, source: CreatureId);

    fn heal(&mut self, creature: CreatureId, amount: f32);

    fn knockback(&mut self, target: EntityRef, velocity: Vec3);

    fn teleport(&mut self, creature: CreatureId, location: Location);

    fn set_target(&mut self, creature: CreatureId, target: Option<PlayerId>);

    fn scale_attribute(&mut self, creature: CreatureId, attribute: Attribute, factor: f32);

    fn announce(&mut self, players: &[PlayerId], announcement: &Announcement);

    fn encounter(&mut self, boss: CreatureId, update: EncounterUpdate);
}

/// Creature creation and removal.
pub trait Spawner {
    fn spawn_creature(
        &mut self,
        variant: Variant,
        level: u32,
        location: Location,
    ) -> Option<CreatureId>;

    fn despawn(&mut self, creature: CreatureId);
}

/// Everything the engine needs from its host.
pub trait World: WorldOracle + EffectSink + Spawner {}

impl<T: WorldOracle + EffectSink + Spawner + ?Sized> World for T {}
