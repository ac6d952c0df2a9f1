//! Reusable decision primitives.
//!
//! Each primitive is a small, deterministic state machine that knows nothing
//! about the world. Variants combine them; the tick context feeds them world
//! data and turns their outcomes into effect requests.
mod channel;
mod commit;
mod cooldown;
mod leash;
mod minions;
mod pack;
mod participants;
mod phase;

pub use channel::Channel;
pub use commit::{CommitCycle, CommitPhase};
pub use cooldown::Cooldown;
pub use leash::{Leash, LeashCheck};
pub use minions::MinionRegistry;
pub use pack::PackTracker;
pub use participants::{ParticipantChanges, ParticipantSet};
pub use phase::{PhaseLadder, PhaseTransition};

use rand::{Rng, RngCore};

/// Bernoulli draw. `p <= 0` never fires, `p >= 1` always fires.
pub fn roll(rng: &mut dyn RngCore, p: f32) -> bool {
    if p <= 0.0 {
        return false;
    }
    if p >= 1.0 {
        return true;
    }
    rng.r#gen::<f32>() < p
}
