use super::Cooldown;
use crate::types::Tick;

/// Capped bonus derived from the number of nearby allies, refreshed on a
/// fixed interval rather than every tick.
#[derive(Clone, Debug, PartialEq)]
pub struct PackTracker {
    cap: u8,
    bonus: u8,
    refresh: Cooldown,
}

impl PackTracker {
    pub fn new(cap: u8, refresh_interval: u64) -> Self {
        Self {
            cap,
            bonus: 0,
            refresh: Cooldown::new(refresh_interval),
        }
    }

    pub fn bonus(&self) -> u8 {
        self.bonus
    }

    /// Recomputes the bonus when the refresh is due. `count_allies` is only
    /// called in that case. Returns the new bonus when it was recomputed.
    pub fn refresh_with(&mut self, now: Tick, count_allies: impl FnOnce() -> usize) -> Option<u8> {
        if !self.refresh.try_use(now) {
            return None;
        }
        let capped = count_allies().min(usize::from(self.cap));
        self.bonus = capped as u8;
        Some(self.bonus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bonus_is_capped() {
        let mut pack = PackTracker::new(5, 20);
        assert_eq!(pack.refresh_with(Tick(0), || 9), Some(5));
        assert_eq!(pack.bonus(), 5);
    }

    #[test]
    fn recomputes_only_when_due() {
        let mut pack = PackTracker::new(5, 20);
        pack.refresh_with(Tick(0), || 2);
        let mut called = false;
        assert_eq!(
            pack.refresh_with(Tick(5), || {
                called = true;
                4
            }),
            None
        );
        assert!(!called);
        assert_eq!(pack.bonus(), 2);
        assert_eq!(pack.refresh_with(Tick(20), || 0), Some(0));
    }
}
