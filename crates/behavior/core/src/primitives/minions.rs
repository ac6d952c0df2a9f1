use crate::types::CreatureId;

/// Live minions owned by a summoner, bounded by a cap.
///
/// Spawning always goes through [`MinionRegistry::remaining_capacity`] so the
/// registry never holds more than `cap` entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MinionRegistry {
    cap: usize,
    live: Vec<CreatureId>,
}

impl MinionRegistry {
    pub fn new(cap: u8) -> Self {
        Self {
            cap: usize::from(cap),
            live: Vec::with_capacity(usize::from(cap)),
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn remaining_capacity(&self) -> usize {
        self.cap.saturating_sub(self.live.len())
    }

    pub fn contains(&self, id: CreatureId) -> bool {
        self.live.contains(&id)
    }

    /// Records a new minion. Refuses duplicates and anything over the cap.
    pub fn try_add(&mut self, id: CreatureId) -> bool {
        if self.remaining_capacity() == 0 || self.contains(id) {
            return false;
        }
        self.live.push(id);
        true
    }

    /// Drops entries that are no longer alive. Returns how many were dropped.
    pub fn prune(&mut self, is_alive: impl Fn(CreatureId) -> bool) -> usize {
        let before = self.live.len();
        self.live.retain(|&id| is_alive(id));
        before - self.live.len()
    }

    pub fn remove(&mut self, id: CreatureId) -> bool {
        let before = self.live.len();
        self.live.retain(|&m| m != id);
        before != self.live.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = CreatureId> + '_ {
        self.live.iter().copied()
    }

    /// Empties the registry, returning the released minions.
    pub fn release(&mut self) -> Vec<CreatureId> {
        std::mem::take(&mut self.live)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cap_is_enforced() {
        let mut registry = MinionRegistry::new(2);
        assert!(registry.try_add(CreatureId(1)));
        assert!(!registry.try_add(CreatureId(1)));
        assert!(registry.try_add(CreatureId(2)));
        assert!(!registry.try_add(CreatureId(3)));
        assert_eq!(registry.remaining_capacity(), 0);
    }

    #[test]
    fn prune_frees_capacity() {
        let mut registry = MinionRegistry::new(3);
        for id in 1..=3 {
            registry.try_add(CreatureId(id));
        }
        let removed = registry.prune(|id| id != CreatureId(2));
        assert_eq!(removed, 1);
        assert_eq!(registry.remaining_capacity(), 1);
        assert_eq!(
            registry.iter().collect::<Vec<_>>(),
            vec![CreatureId(1), CreatureId(3)]
        );
    }

    #[test]
    fn release_empties() {
        let mut registry = MinionRegistry::new(3);
        registry.try_add(CreatureId(9));
        assert_eq!(registry.release(), vec![CreatureId(9)]);
        assert!(registry.is_empty());
    }
}
