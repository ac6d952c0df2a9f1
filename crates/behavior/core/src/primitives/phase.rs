use arrayvec::ArrayVec;

use crate::config::EngineConfig;

/// A phase change reported by [`PhaseLadder::check`]. Phases are one-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseTransition {
    pub from: u8,
    pub to: u8,
}

/// Monotonic phase index driven by health thresholds.
///
/// Phase `n` ends when health drops strictly below `thresholds[n - 1]`. A
/// single check advances at most one phase, and healing never moves the
/// ladder back.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseLadder {
    thresholds: ArrayVec<f32, { EngineConfig::MAX_PHASES }>,
    current: u8,
}

impl PhaseLadder {
    /// Builds a ladder from strictly decreasing thresholds. Entries beyond
    /// [`EngineConfig::MAX_PHASES`] are ignored; descriptors are validated
    /// before they get here.
    pub fn new(thresholds: &[f32]) -> Self {
        Self {
            thresholds: thresholds
                .iter()
                .copied()
                .take(EngineConfig::MAX_PHASES)
                .collect(),
            current: 1,
        }
    }

    pub fn current(&self) -> u8 {
        self.current
    }

    pub fn phase_count(&self) -> u8 {
        self.thresholds.len() as u8 + 1
    }

    pub fn is_final(&self) -> bool {
        self.current >= self.phase_count()
    }

    pub fn has_phases(&self) -> bool {
        !self.thresholds.is_empty()
    }

    pub fn check(&mut self, health_ratio: f32) -> Option<PhaseTransition> {
        let threshold = *self.thresholds.get(usize::from(self.current) - 1)?;
        if health_ratio < threshold {
            let from = self.current;
            self.current += 1;
            Some(PhaseTransition {
                from,
                to: self.current,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_threshold_does_not_transition() {
        let mut ladder = PhaseLadder::new(&[0.5, 0.2]);
        assert_eq!(ladder.check(0.5), None);
        assert_eq!(ladder.check(0.49), Some(PhaseTransition { from: 1, to: 2 }));
    }

    #[test]
    fn advances_one_phase_per_check() {
        let mut ladder = PhaseLadder::new(&[0.75, 0.5, 0.25]);
        assert_eq!(ladder.check(0.1), Some(PhaseTransition { from: 1, to: 2 }));
        assert_eq!(ladder.check(0.1), Some(PhaseTransition { from: 2, to: 3 }));
        assert_eq!(ladder.check(0.1), Some(PhaseTransition { from: 3, to: 4 }));
        assert!(ladder.is_final());
        assert_eq!(ladder.check(0.0), None);
    }

    #[test]
    fn healing_never_regresses() {
        let mut ladder = PhaseLadder::new(&[0.5]);
        ladder.check(0.3);
        assert_eq!(ladder.current(), 2);
        assert_eq!(ladder.check(1.0), None);
        assert_eq!(ladder.current(), 2);
    }

    #[test]
    fn empty_ladder_is_single_phase() {
        let mut ladder = PhaseLadder::new(&[]);
        assert!(!ladder.has_phases());
        assert_eq!(ladder.phase_count(), 1);
        assert_eq!(ladder.check(0.0), None);
    }
}
