//! Vocabulary of effect requests handed to the world.

use crate::types::PlayerId;

/// Status effects the engine may request. Magnitude 0 is the weakest level.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum StatusKind {
    Slowness,
    Speed,
    Strength,
    Weakness,
    Resistance,
    Wither,
    Darkness,
    Glowing,
    Regeneration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub duration: u64,
    pub magnitude: u8,
}

impl StatusEffect {
    pub const fn new(kind: StatusKind, duration: u64, magnitude: u8) -> Self {
        Self {
            kind,
            duration,
            magnitude,
        }
    }
}

/// Cosmetic feedback. The world decides how each kind looks and sounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum FxKind {
    Enrage,
    PhaseShift,
    Telegraph,
    Impact,
    Shockwave,
    Summon,
    Channel,
    ChannelBroken,
    Teleport,
    Howl,
    Leap,
    Groan,
    Heal,
    Victory,
}

/// Creature attributes the engine may scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Attribute {
    AttackDamage,
    MovementSpeed,
    KnockbackResistance,
}

/// Title message for a group of players.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Announcement {
    pub title: String,
    pub subtitle: String,
}

impl Announcement {
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
        }
    }
}

/// Snapshot rendered on a boss encounter bar.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncounterBar {
    pub title: String,
    /// Health fraction in `[0, 1]`.
    pub progress: f32,
    /// One-based current phase.
    pub phase: u8,
    pub phases: u8,
    pub vulnerable: bool,
}

impl EncounterBar {
    pub fn label(&self) -> String {
        if self.vulnerable {
            format!("{} - Phase {}/{} - VULNERABLE", self.title, self.phase, self.phases)
        } else {
            format!("{} - Phase {}/{}", self.title, self.phase, self.phases)
        }
    }
}

/// Changes to the visible encounter state of a boss.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EncounterUpdate {
    Join(PlayerId),
    Leave(PlayerId),
    Progress(EncounterBar),
    Close,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_label_mentions_phase() {
        let mut bar = EncounterBar {
            title: "The Gravedigger".into(),
            progress: 0.4,
            phase: 2,
            phases: 3,
            vulnerable: false,
        };
        assert_eq!(bar.label(), "The Gravedigger - Phase 2/3");
        bar.vulnerable = true;
        assert!(bar.label().ends_with("VULNERABLE"));
    }
}
