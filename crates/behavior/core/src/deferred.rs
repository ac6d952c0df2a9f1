//! Scheduled follow-up work owned by behaviour instances.
//!
//! Multi-step abilities are expressed as explicit [`DeferredAction`] values
//! rather than captured closures. Each action names its owner; at resolution
//! time the manager re-validates the owner and the instance re-validates any
//! target before acting, so stale work degrades to a no-op.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use rand::RngCore;

use crate::env::StatusEffect;
use crate::types::{CreatureId, Location, PlayerId, Tick};
use crate::variant::VariantKind;

/// Where an impact lands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImpactSite {
    /// A fixed point chosen when the action was scheduled.
    At(Location),
    /// The owner's position at resolution time.
    Owner,
    /// The target's position at resolution time.
    Target,
}

/// Area hit resolved after a telegraph.
#[derive(Clone, Debug, PartialEq)]
pub struct Impact {
    /// Intended target. When set, the impact is dropped if the target is no
    /// longer valid.
    pub target: Option<PlayerId>,
    pub site: ImpactSite,
    pub radius: f64,
    pub damage: f32,
    pub status: Option<StatusEffect>,
    /// Horizontal knockback strength away from the site.
    pub knockback: f64,
    /// Fraction of damage dealt returned to the owner as healing.
    pub drain: f32,
}

impl Impact {
    pub fn new(site: ImpactSite, radius: f64, damage: f32) -> Self {
        Self {
            target: None,
            site,
            radius,
            damage,
            status: None,
            knockback: 0.0,
            drain: 0.0,
        }
    }

    pub fn targeting(mut self, target: PlayerId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_status(mut self, status: StatusEffect) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_knockback(mut self, strength: f64) -> Self {
        self.knockback = strength;
        self
    }

    pub fn with_drain(mut self, fraction: f32) -> Self {
        self.drain = fraction;
        self
    }
}

/// Which kinds a summon draws from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MinionPool {
    /// 70 % walkers, 30 % crawlers.
    Undead,
    Shadows,
    Skeletons,
}

impl MinionPool {
    pub fn pick(self, rng: &mut dyn RngCore) -> VariantKind {
        match self {
            MinionPool::Undead => {
                if crate::primitives::roll(rng, 0.7) {
                    VariantKind::Walker
                } else {
                    VariantKind::Crawler
                }
            }
            MinionPool::Shadows => VariantKind::Shadow,
            MinionPool::Skeletons => VariantKind::Skeleton,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DeferredAction {
    Impact(Impact),
    /// One ring of an expanding earthquake. Schedules the next ring until
    /// `wave == waves`.
    Shockwave {
        origin: Location,
        wave: u8,
        waves: u8,
        interval: u64,
        damage: f32,
    },
    SummonMinions {
        count: u8,
        level: u32,
        pool: MinionPool,
        target: Option<PlayerId>,
    },
    /// End of the committing stage of the owner's commit cycle.
    CommitEnd,
    /// End of the owner's vulnerability window.
    VulnerabilityEnd,
}

impl From<Impact> for DeferredAction {
    fn from(impact: Impact) -> Self {
        DeferredAction::Impact(impact)
    }
}

impl DeferredAction {
    pub fn name(&self) -> &'static str {
        match self {
            DeferredAction::Impact(_) => "impact",
            DeferredAction::Shockwave { .. } => "shockwave",
            DeferredAction::SummonMinions { .. } => "summon_minions",
            DeferredAction::CommitEnd => "commit_end",
            DeferredAction::VulnerabilityEnd => "vulnerability_end",
        }
    }

    /// Player the action is aimed at, if any.
    pub fn target(&self) -> Option<PlayerId> {
        match self {
            DeferredAction::Impact(impact) => impact.target,
            DeferredAction::SummonMinions { target, .. } => *target,
            _ => None,
        }
    }
}

/// An action waiting in the queue.
#[derive(Clone, Debug)]
pub struct Scheduled {
    pub due: Tick,
    pub seq: u64,
    pub owner: CreatureId,
    pub action: DeferredAction,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// Min-heap of scheduled actions ordered by due tick, then insertion order.
#[derive(Debug, Default)]
pub struct DeferredQueue {
    heap: BinaryHeap<Reverse<Scheduled>>,
    next_seq: u64,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `action` for `now + delay`. Delays shorter than one tick are
    /// rounded up so nothing resolves within the tick that scheduled it.
    pub fn schedule(
        &mut self,
        now: Tick,
        delay: u64,
        owner: CreatureId,
        action: DeferredAction,
    ) -> Tick {
        let due = now + delay.max(1);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Scheduled {
            due,
            seq,
            owner,
            action,
        }));
        due
    }

    /// Pops the earliest action due at or before `now`.
    pub fn pop_due(&mut self, now: Tick) -> Option<Scheduled> {
        if self.heap.peek()?.0.due > now {
            return None;
        }
        self.heap.pop().map(|Reverse(entry)| entry)
    }

    pub fn next_due(&self) -> Option<Tick> {
        self.heap.peek().map(|entry| entry.0.due)
    }

    pub fn pending_for(&self, owner: CreatureId) -> usize {
        self.heap.iter().filter(|entry| entry.0.owner == owner).count()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
