use super::Cooldown;
use crate::types::{Location, Tick};

/// Outcome of a leash check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeashCheck {
    /// The periodic check is not due yet.
    NotDue,
    Within,
    /// Farther than the radius from the anchor.
    Exceeded,
}

/// Keeps a creature within a fixed radius of its spawn anchor.
///
/// Distances are compared squared; a creature exactly on the radius is
/// within bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct Leash {
    anchor: Location,
    radius_sq: f64,
    gate: Cooldown,
}

impl Leash {
    pub fn new(anchor: Location, radius: f64, check_interval: u64) -> Self {
        Self {
            anchor,
            radius_sq: radius * radius,
            gate: Cooldown::new(check_interval),
        }
    }

    pub fn anchor(&self) -> Location {
        self.anchor
    }

    pub fn check(&mut self, now: Tick, position: &Location) -> LeashCheck {
        if !self.gate.try_use(now) {
            return LeashCheck::NotDue;
        }
        if position.distance_squared(&self.anchor) > self.radius_sq {
            LeashCheck::Exceeded
        } else {
            LeashCheck::Within
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_is_within() {
        let mut leash = Leash::new(Location::new(0.0, 64.0, 0.0), 40.0, 20);
        assert_eq!(
            leash.check(Tick(0), &Location::new(40.0, 64.0, 0.0)),
            LeashCheck::Within
        );
    }

    #[test]
    fn checks_only_when_due() {
        let mut leash = Leash::new(Location::new(0.0, 64.0, 0.0), 40.0, 20);
        let far = Location::new(45.0, 64.0, 0.0);
        assert_eq!(leash.check(Tick(0), &far), LeashCheck::Exceeded);
        assert_eq!(leash.check(Tick(10), &far), LeashCheck::NotDue);
        assert_eq!(leash.check(Tick(20), &far), LeashCheck::Exceeded);
    }
}
