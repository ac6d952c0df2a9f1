use rand::RngCore;

use crate::types::Tick;

/// An interruptible timed action (a ritual, a cast).
///
/// Unlike a commit, a channel may be broken by incoming damage with some
/// probability. Completion is polled by the owner on its own ticks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Channel {
    active: Option<(Tick, u64)>,
}

impl Channel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Starts channeling for `duration` ticks unless already active.
    pub fn start(&mut self, now: Tick, duration: u64) -> bool {
        if self.active.is_some() {
            return false;
        }
        self.active = Some((now, duration));
        true
    }

    /// Fraction of the channel elapsed, zero when inactive.
    pub fn progress(&self, now: Tick) -> f32 {
        match self.active {
            Some((_, 0)) => 1.0,
            Some((started, duration)) => {
                (now.saturating_since(started) as f32 / duration as f32).min(1.0)
            }
            None => 0.0,
        }
    }

    /// Ends the channel when its duration has elapsed. Returns whether it
    /// completed on this call.
    pub fn poll_complete(&mut self, now: Tick) -> bool {
        match self.active {
            Some((started, duration)) if now.saturating_since(started) >= duration => {
                self.active = None;
                true
            }
            _ => false,
        }
    }

    /// Breaks an active channel with probability `chance`.
    pub fn try_interrupt(&mut self, rng: &mut dyn RngCore, chance: f32) -> bool {
        if self.active.is_none() || !super::roll(rng, chance) {
            return false;
        }
        self.active = None;
        true
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn completes_after_duration() {
        let mut channel = Channel::new();
        assert!(channel.start(Tick(10), 100));
        assert!(!channel.start(Tick(11), 100));
        assert!(!channel.poll_complete(Tick(109)));
        assert!((channel.progress(Tick(60)) - 0.5).abs() < f32::EPSILON);
        assert!(channel.poll_complete(Tick(110)));
        assert!(!channel.is_active());
    }

    #[test]
    fn interrupt_depends_on_roll() {
        let mut channel = Channel::new();
        channel.start(Tick(0), 100);

        let mut never = StepRng::new(u64::MAX, 0);
        assert!(!channel.try_interrupt(&mut never, 0.3));
        assert!(channel.is_active());

        let mut always = StepRng::new(0, 0);
        assert!(channel.try_interrupt(&mut always, 0.3));
        assert!(!channel.is_active());
        assert!(!channel.try_interrupt(&mut always, 0.3));
    }
}
