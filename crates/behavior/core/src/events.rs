//! Notifications emitted by the engine for observers (logging, admin tools,
//! the runtime event bus). Events never feed back into decisions.

use crate::primitives::PhaseTransition;
use crate::types::{CreatureId, Location, PlayerId, Tick};
use crate::variant::Variant;

/// Named abilities, for observers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Ability {
    Groan,
    Pounce,
    SpeedBurst,
    BandageLash,
    ShieldBash,
    ArmorPierce,
    IronFortress,
    Cleave,
    BloodFrenzy,
    ExecutionStrike,
    GroundSlam,
    RaiseDead,
    BoulderThrow,
    Earthquake,
    Summon,
    DarkBolt,
    DarkRitual,
    Howl,
    Leap,
    SavageBite,
}

/// Why an instance left the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum RemovalReason {
    Died,
    /// Found invalid (despawned or dead) during a pass.
    Invalid,
    /// Found invalid by the periodic sweep.
    Swept,
    ForceStopped,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BehaviorEvent {
    Registered {
        creature: CreatureId,
        variant: Variant,
        level: u32,
    },
    Removed {
        creature: CreatureId,
        reason: RemovalReason,
    },
    PhaseChanged {
        creature: CreatureId,
        transition: PhaseTransition,
    },
    Enraged {
        creature: CreatureId,
    },
    Leashed {
        creature: CreatureId,
        anchor: Location,
    },
    CommitStarted {
        creature: CreatureId,
        ability: Ability,
        until: Tick,
    },
    /// An ability that took effect immediately, without a commit.
    AbilityUsed {
        creature: CreatureId,
        ability: Ability,
    },
    VulnerabilityOpened {
        creature: CreatureId,
        until: Tick,
    },
    VulnerabilityClosed {
        creature: CreatureId,
    },
    MinionsSummoned {
        summoner: CreatureId,
        requested: u8,
        minions: Vec<CreatureId>,
    },
    RitualInterrupted {
        creature: CreatureId,
    },
    RitualCompleted {
        creature: CreatureId,
    },
    EncounterJoined {
        boss: CreatureId,
        player: PlayerId,
    },
    EncounterLeft {
        boss: CreatureId,
        player: PlayerId,
    },
    Fault {
        creature: CreatureId,
        code: String,
        message: String,
    },
}

impl BehaviorEvent {
    /// The creature this event is about.
    pub fn creature(&self) -> CreatureId {
        match self {
            Self::Registered { creature, .. }
            | Self::Removed { creature, .. }
            | Self::PhaseChanged { creature, .. }
            | Self::Enraged { creature }
            | Self::Leashed { creature, .. }
            | Self::CommitStarted { creature, .. }
            | Self::AbilityUsed { creature, .. }
            | Self::VulnerabilityOpened { creature, .. }
            | Self::VulnerabilityClosed { creature }
            | Self::RitualInterrupted { creature }
            | Self::RitualCompleted { creature }
            | Self::Fault { creature, .. } => *creature,
            Self::MinionsSummoned { summoner, .. } => *summoner,
            Self::EncounterJoined { boss, .. } | Self::EncounterLeft { boss, .. } => *boss,
        }
    }

    /// Lifecycle events concern registration, removal and faults.
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            Self::Registered { .. } | Self::Removed { .. } | Self::Fault { .. }
        )
    }

    pub fn is_encounter(&self) -> bool {
        matches!(
            self,
            Self::PhaseChanged { .. }
                | Self::EncounterJoined { .. }
                | Self::EncounterLeft { .. }
                | Self::VulnerabilityOpened { .. }
                | Self::VulnerabilityClosed { .. }
        )
    }
}
