use crate::types::Tick;

/// Ability cooldown measured in logical ticks.
///
/// A cooldown that has never been used is ready. Readiness uses `>=`, so a
/// cooldown is ready again exactly `interval` ticks after its last use. The
/// same type doubles as a periodic gate for checks that run every N ticks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cooldown {
    interval: u64,
    last_used: Option<Tick>,
}

impl Cooldown {
    pub const fn new(interval: u64) -> Self {
        Self {
            interval,
            last_used: None,
        }
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }

    pub fn last_used(&self) -> Option<Tick> {
        self.last_used
    }

    pub fn is_ready(&self, now: Tick) -> bool {
        self.last_used
            .is_none_or(|used| now.saturating_since(used) >= self.interval)
    }

    pub fn mark_used(&mut self, now: Tick) {
        self.last_used = Some(now);
    }

    /// Marks the cooldown used when ready. Returns whether it fired.
    pub fn try_use(&mut self, now: Tick) -> bool {
        if self.is_ready(now) {
            self.mark_used(now);
            true
        } else {
            false
        }
    }

    /// Ticks until ready, zero when ready.
    pub fn remaining(&self, now: Tick) -> u64 {
        match self.last_used {
            Some(used) => self.interval.saturating_sub(now.saturating_since(used)),
            None => 0,
        }
    }

    pub fn reset(&mut self) {
        self.last_used = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_used_is_ready() {
        let cooldown = Cooldown::new(100);
        assert!(cooldown.is_ready(Tick(0)));
        assert_eq!(cooldown.remaining(Tick(0)), 0);
    }

    #[test]
    fn ready_exactly_at_interval() {
        let mut cooldown = Cooldown::new(100);
        cooldown.mark_used(Tick(50));
        assert!(!cooldown.is_ready(Tick(149)));
        assert_eq!(cooldown.remaining(Tick(149)), 1);
        assert!(cooldown.is_ready(Tick(150)));
    }

    #[test]
    fn try_use_fires_once_per_interval() {
        let mut gate = Cooldown::new(20);
        assert!(gate.try_use(Tick(0)));
        assert!(!gate.try_use(Tick(10)));
        assert!(gate.try_use(Tick(20)));
        gate.reset();
        assert!(gate.try_use(Tick(21)));
    }
}
