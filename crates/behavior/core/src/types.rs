//! Identifier, time and geometry primitives shared by every module.

use core::fmt;
use core::ops::{Add, Sub};

/// Identifier of a creature owned by the external world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatureId(pub u64);

impl fmt::Display for CreatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c#{}", self.0)
    }
}

/// Identifier of a player owned by the external world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p#{}", self.0)
    }
}

/// Either side of an interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityRef {
    Creature(CreatureId),
    Player(PlayerId),
}

impl EntityRef {
    pub fn as_player(self) -> Option<PlayerId> {
        match self {
            EntityRef::Player(id) => Some(id),
            EntityRef::Creature(_) => None,
        }
    }

    pub fn as_creature(self) -> Option<CreatureId> {
        match self {
            EntityRef::Creature(id) => Some(id),
            EntityRef::Player(_) => None,
        }
    }
}

impl From<PlayerId> for EntityRef {
    fn from(id: PlayerId) -> Self {
        EntityRef::Player(id)
    }
}

impl From<CreatureId> for EntityRef {
    fn from(id: CreatureId) -> Self {
        EntityRef::Creature(id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Creature(id) => id.fmt(f),
            EntityRef::Player(id) => id.fmt(f),
        }
    }
}

/// Logical simulation tick. The host advances it at a fixed cadence
/// (see [`crate::config::EngineConfig::TICKS_PER_SECOND`]).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Ticks elapsed since `earlier`, zero when `earlier` lies in the future.
    pub fn saturating_since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    pub fn is_multiple_of(self, interval: u64) -> bool {
        interval != 0 && self.0 % interval == 0
    }
}

impl Add<u64> for Tick {
    type Output = Tick;

    fn add(self, rhs: u64) -> Tick {
        Tick(self.0.saturating_add(rhs))
    }
}

impl Sub<u64> for Tick {
    type Output = Tick;

    fn sub(self, rhs: u64) -> Tick {
        Tick(self.0.saturating_sub(rhs))
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Free vector, used for knockback and directions.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction; the zero vector stays zero.
    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len <= f64::EPSILON {
            return Vec3::ZERO;
        }
        self.scaled(1.0 / len)
    }

    pub fn scaled(self, factor: f64) -> Vec3 {
        Vec3::new(self.x * factor, self.y * factor, self.z * factor)
    }

    pub fn with_y(self, y: f64) -> Vec3 {
        Vec3::new(self.x, y, self.z)
    }
}

/// Point in world space. `y` is the vertical axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance_squared(&self, other: &Location) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn distance(&self, other: &Location) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Vector pointing from `self` towards `other`.
    pub fn direction_to(&self, other: &Location) -> Vec3 {
        Vec3::new(other.x - self.x, other.y - self.y, other.z - self.z)
    }

    pub fn offset(&self, by: Vec3) -> Location {
        Location::new(self.x + by.x, self.y + by.y, self.z + by.z)
    }

    /// Point `distance` blocks away on the horizontal plane at `angle` radians.
    pub fn horizontal_offset(&self, angle: f64, distance: f64) -> Location {
        Location::new(
            self.x + angle.cos() * distance,
            self.y,
            self.z + angle.sin() * distance,
        )
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_arithmetic_saturates() {
        assert_eq!(Tick(5) - 10, Tick::ZERO);
        assert_eq!(Tick(u64::MAX) + 1, Tick(u64::MAX));
        assert_eq!(Tick(30).saturating_since(Tick(10)), 20);
        assert_eq!(Tick(10).saturating_since(Tick(30)), 0);
    }

    #[test]
    fn multiples_ignore_zero_interval() {
        assert!(Tick(600).is_multiple_of(600));
        assert!(!Tick(601).is_multiple_of(600));
        assert!(!Tick(10).is_multiple_of(0));
    }

    #[test]
    fn horizontal_offset_keeps_height() {
        let origin = Location::new(0.0, 64.0, 0.0);
        let moved = origin.horizontal_offset(0.0, 5.0);
        assert_eq!(moved.y, 64.0);
        assert!((origin.distance(&moved) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn zero_vector_normalizes_to_zero() {
        assert_eq!(Vec3::ZERO.normalized(), Vec3::ZERO);
        let unit = Vec3::new(3.0, 0.0, 4.0).normalized();
        assert!((unit.length() - 1.0).abs() < 1e-9);
    }
}
