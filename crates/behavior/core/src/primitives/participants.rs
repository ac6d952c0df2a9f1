use std::collections::BTreeSet;

use crate::env::PlayerSnapshot;
use crate::types::{Location, PlayerId};

/// Players added and removed by one [`ParticipantSet::update`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParticipantChanges {
    pub joined: Vec<PlayerId>,
    pub left: Vec<PlayerId>,
}

impl ParticipantChanges {
    pub fn is_empty(&self) -> bool {
        self.joined.is_empty() && self.left.is_empty()
    }
}

/// Players engaged in an encounter, with hysteresis.
///
/// Players join within the detection radius and leave only once they go
/// offline, die, or move beyond the (larger or equal) release radius, so a
/// player hovering at the edge does not flicker in and out.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticipantSet {
    detection_sq: f64,
    release_sq: f64,
    members: BTreeSet<PlayerId>,
}

impl ParticipantSet {
    pub fn new(detection_radius: f64, release_radius: f64) -> Self {
        Self {
            detection_sq: detection_radius * detection_radius,
            release_sq: release_radius.max(detection_radius).powi(2),
            members: BTreeSet::new(),
        }
    }

    pub fn detection_radius(&self) -> f64 {
        self.detection_sq.sqrt()
    }

    /// Applies one membership pass.
    ///
    /// `nearby` holds join candidates (usually the players found within the
    /// detection radius); `lookup` resolves current members, `None` meaning the
    /// player no longer exists.
    pub fn update(
        &mut self,
        center: &Location,
        nearby: &[PlayerSnapshot],
        lookup: impl Fn(PlayerId) -> Option<PlayerSnapshot>,
    ) -> ParticipantChanges {
        let mut changes = ParticipantChanges::default();

        let release_sq = self.release_sq;
        self.members.retain(|&id| {
            let keep = lookup(id).is_some_and(|player| {
                player.online
                    && player.alive
                    && player.position.distance_squared(center) <= release_sq
            });
            if !keep {
                changes.left.push(id);
            }
            keep
        });

        for player in nearby {
            if player.online
                && player.alive
                && player.position.distance_squared(center) <= self.detection_sq
                && self.members.insert(player.id)
            {
                changes.joined.push(player.id);
            }
        }

        changes
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.members.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> Vec<PlayerId> {
        self.members.iter().copied().collect()
    }

    /// Removes every member, returning them.
    pub fn clear(&mut self) -> Vec<PlayerId> {
        std::mem::take(&mut self.members).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: u64, x: f64, online: bool) -> PlayerSnapshot {
        PlayerSnapshot {
            id: PlayerId(id),
            position: Location::new(x, 64.0, 0.0),
            health: 20.0,
            max_health: 20.0,
            online,
            alive: true,
            targetable: true,
        }
    }

    #[test]
    fn hysteresis_between_radii() {
        let center = Location::new(0.0, 64.0, 0.0);
        let mut set = ParticipantSet::new(50.0, 60.0);

        let near = player(1, 45.0, true);
        let changes = set.update(&center, &[near.clone()], |_| Some(near.clone()));
        assert_eq!(changes.joined, vec![PlayerId(1)]);

        // Drifts to 55: outside detection, inside release.
        let drifted = player(1, 55.0, true);
        let changes = set.update(&center, &[], |_| Some(drifted.clone()));
        assert!(changes.is_empty());
        assert!(set.contains(PlayerId(1)));

        // Beyond release.
        let gone = player(1, 61.0, true);
        let changes = set.update(&center, &[], |_| Some(gone.clone()));
        assert_eq!(changes.left, vec![PlayerId(1)]);
        assert!(set.is_empty());
    }

    #[test]
    fn candidate_between_radii_does_not_join() {
        let center = Location::new(0.0, 64.0, 0.0);
        let mut set = ParticipantSet::new(50.0, 60.0);
        let edge = player(2, 55.0, true);
        let changes = set.update(&center, &[edge], |_| None);
        assert!(changes.joined.is_empty());
    }

    #[test]
    fn offline_members_leave() {
        let center = Location::new(0.0, 64.0, 0.0);
        let mut set = ParticipantSet::new(50.0, 60.0);
        let online = player(3, 10.0, true);
        set.update(&center, &[online], |_| None);

        let offline = player(3, 10.0, false);
        let changes = set.update(&center, &[], |_| Some(offline.clone()));
        assert_eq!(changes.left, vec![PlayerId(3)]);
    }

    #[test]
    fn dead_members_leave_and_do_not_rejoin() {
        let center = Location::new(0.0, 64.0, 0.0);
        let mut set = ParticipantSet::new(50.0, 60.0);
        let fighting = player(5, 20.0, true);
        set.update(&center, &[fighting], |_| None);
        assert!(set.contains(PlayerId(5)));

        let fallen = PlayerSnapshot {
            alive: false,
            health: 0.0,
            ..player(5, 20.0, true)
        };
        let changes = set.update(&center, &[fallen.clone()], |_| Some(fallen.clone()));
        assert_eq!(changes.left, vec![PlayerId(5)]);
        assert!(changes.joined.is_empty());
        assert!(set.is_empty());
    }

    #[test]
    fn equal_radii_degenerate_to_single_threshold() {
        let center = Location::new(0.0, 64.0, 0.0);
        let mut set = ParticipantSet::new(30.0, 30.0);
        let at_edge = player(4, 30.0, true);
        set.update(&center, &[at_edge.clone()], |_| Some(at_edge.clone()));
        assert!(set.contains(PlayerId(4)));

        let past = player(4, 30.5, true);
        set.update(&center, &[], |_| Some(past.clone()));
        assert!(!set.contains(PlayerId(4)));
    }
}
