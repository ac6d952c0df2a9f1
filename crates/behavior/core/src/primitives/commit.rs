use crate::types::Tick;

/// Where a creature is in its commit → vulnerability cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommitPhase {
    #[default]
    Idle,
    /// Winding up an action that cannot be cancelled.
    Committing { until: Tick },
    /// Recovering after the action; open to punishment.
    Vulnerable { until: Tick },
}

/// Two-stage action state machine: Idle → Committing → (Vulnerable) → Idle.
///
/// Transitions out of the timed stages are driven externally (the owner
/// schedules deferred steps for `until`), which keeps this type free of any
/// clock. New commits are refused unless idle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitCycle {
    phase: CommitPhase,
}

impl CommitCycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> CommitPhase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == CommitPhase::Idle
    }

    pub fn is_committing(&self) -> bool {
        matches!(self.phase, CommitPhase::Committing { .. })
    }

    pub fn is_vulnerable(&self) -> bool {
        matches!(self.phase, CommitPhase::Vulnerable { .. })
    }

    /// Starts a commit of `duration` ticks. Returns its end tick, or `None`
    /// when the cycle is busy.
    pub fn begin(&mut self, now: Tick, duration: u64) -> Option<Tick> {
        if !self.is_idle() {
            return None;
        }
        let until = now + duration;
        self.phase = CommitPhase::Committing { until };
        Some(until)
    }

    /// Ends the commit. With a non-zero `vulnerable_for` the cycle moves to
    /// Vulnerable and the window end is returned; otherwise it returns to
    /// Idle. Does nothing unless committing.
    pub fn complete(&mut self, now: Tick, vulnerable_for: u64) -> Option<Tick> {
        if !self.is_committing() {
            return None;
        }
        if vulnerable_for == 0 {
            self.phase = CommitPhase::Idle;
            return None;
        }
        let until = now + vulnerable_for;
        self.phase = CommitPhase::Vulnerable { until };
        Some(until)
    }

    /// Closes the vulnerability window. Returns whether it was open.
    pub fn recover(&mut self) -> bool {
        if self.is_vulnerable() {
            self.phase = CommitPhase::Idle;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.phase = CommitPhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_cycle() {
        let mut cycle = CommitCycle::new();
        assert_eq!(cycle.begin(Tick(100), 20), Some(Tick(120)));
        assert!(cycle.is_committing());
        assert_eq!(cycle.begin(Tick(110), 20), None);

        assert_eq!(cycle.complete(Tick(120), 60), Some(Tick(180)));
        assert!(cycle.is_vulnerable());
        assert_eq!(cycle.begin(Tick(150), 20), None);

        assert!(cycle.recover());
        assert!(cycle.is_idle());
    }

    #[test]
    fn zero_vulnerability_returns_to_idle() {
        let mut cycle = CommitCycle::new();
        cycle.begin(Tick(0), 10);
        assert_eq!(cycle.complete(Tick(10), 0), None);
        assert!(cycle.is_idle());
    }

    #[test]
    fn stray_steps_are_ignored() {
        let mut cycle = CommitCycle::new();
        assert_eq!(cycle.complete(Tick(5), 60), None);
        assert!(!cycle.recover());
        assert!(cycle.is_idle());
    }
}
