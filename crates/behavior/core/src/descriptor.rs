//! Static per-variant tuning data.
//!
//! A [`BehaviorDescriptor`] is loaded once, validated, and then shared between
//! every instance of its kind through an `Arc`. All durations are in logical
//! ticks.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::variant::{Category, Variant, VariantKind};

/// Invalid descriptor data.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum DescriptorError {
    #[error("{kind}: phase threshold {value} is outside (0, 1)")]
    ThresholdOutOfRange { kind: VariantKind, value: f32 },

    #[error("{kind}: phase thresholds must be strictly decreasing ({previous} then {next})")]
    ThresholdsNotDecreasing {
        kind: VariantKind,
        previous: f32,
        next: f32,
    },

    #[error("{kind}: {count} phase thresholds exceed the limit of {max}")]
    TooManyPhases {
        kind: VariantKind,
        count: usize,
        max: usize,
    },

    #[error("{kind}: release radius {release} is smaller than detection radius {detection}")]
    ReleaseInsideDetection {
        kind: VariantKind,
        detection: f64,
        release: f64,
    },

    #[error("{kind}: leash radius {radius} must be positive")]
    InvalidLeash { kind: VariantKind, radius: f64 },

    #[error("{kind}: probability {value} for `{field}` is outside [0, 1]")]
    InvalidProbability {
        kind: VariantKind,
        field: &'static str,
        value: f32,
    },

    #[error("{kind}: phase transition multiplier `{field}` must be positive, got {value}")]
    InvalidMultiplier {
        kind: VariantKind,
        field: &'static str,
        value: f32,
    },

    #[error("{kind} belongs to {expected}, descriptor declares {declared}")]
    CategoryMismatch {
        kind: VariantKind,
        expected: Category,
        declared: Category,
    },

    #[error("duplicate descriptor for {0}")]
    Duplicate(VariantKind),
}

/// Effects applied on every phase transition.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PhaseTransitionSpec {
    pub damage_multiplier: f32,
    pub speed_multiplier: f32,
    /// Fraction of max health restored.
    pub heal_fraction: f32,
    /// Duration of the damage immunity window.
    pub immunity_ticks: u64,
    /// Duration during which no new ability is started.
    pub lockout_ticks: u64,
}

impl Default for PhaseTransitionSpec {
    fn default() -> Self {
        Self {
            damage_multiplier: 1.15,
            speed_multiplier: 1.1,
            heal_fraction: 0.1,
            immunity_ticks: 60,
            lockout_ticks: 60,
        }
    }
}

mod defaults {
    pub(super) fn ability_cooldown() -> u64 {
        100
    }

    pub(super) fn aggro_radius() -> f64 {
        24.0
    }

    pub(super) fn check_interval() -> u64 {
        20
    }
}

/// Tuning for one [`VariantKind`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BehaviorDescriptor {
    pub kind: VariantKind,
    pub category: Category,
    #[cfg_attr(feature = "serde", serde(default = "defaults::ability_cooldown"))]
    pub ability_cooldown: u64,
    /// Cooldown of the secondary ability. Zero disables it.
    #[cfg_attr(feature = "serde", serde(default))]
    pub special_cooldown: u64,
    /// Health fractions that start phases 2, 3, … in strictly decreasing order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub phase_thresholds: Vec<f32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub phase_transition: PhaseTransitionSpec,
    /// Radius searched for a target player.
    #[cfg_attr(feature = "serde", serde(default = "defaults::aggro_radius"))]
    pub aggro_radius: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub leash_radius: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default = "defaults::check_interval"))]
    pub leash_check_interval: u64,
    /// Participant join radius. Zero disables the participant set.
    #[cfg_attr(feature = "serde", serde(default))]
    pub detection_radius: f64,
    /// Participant leave radius, at least `detection_radius`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub release_radius: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_minions: u8,
    /// Wind-up of committed abilities.
    #[cfg_attr(feature = "serde", serde(default))]
    pub commit_ticks: u64,
    /// Vulnerability window that follows a committed ability. Zero skips it.
    #[cfg_attr(feature = "serde", serde(default))]
    pub vulnerable_ticks: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pack_radius: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pack_cap: u8,
    #[cfg_attr(feature = "serde", serde(default = "defaults::check_interval"))]
    pub pack_refresh_interval: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub counter_chance: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub counter_damage: f32,
    /// Extra damage dealt whenever the creature lands a melee hit.
    #[cfg_attr(feature = "serde", serde(default))]
    pub bonus_damage: f32,
}

impl BehaviorDescriptor {
    /// Bare descriptor for `kind` under its home category.
    pub fn new(kind: VariantKind) -> Self {
        Self {
            kind,
            category: kind.category(),
            ability_cooldown: defaults::ability_cooldown(),
            special_cooldown: 0,
            phase_thresholds: Vec::new(),
            phase_transition: PhaseTransitionSpec::default(),
            aggro_radius: defaults::aggro_radius(),
            leash_radius: None,
            leash_check_interval: defaults::check_interval(),
            detection_radius: 0.0,
            release_radius: 0.0,
            max_minions: 0,
            commit_ticks: 0,
            vulnerable_ticks: 0,
            pack_radius: 0.0,
            pack_cap: 0,
            pack_refresh_interval: defaults::check_interval(),
            counter_chance: 0.0,
            counter_damage: 0.0,
            bonus_damage: 0.0,
        }
    }

    /// Reference tuning shipped with the engine.
    pub fn standard(kind: VariantKind) -> Self {
        let secs = EngineConfig::seconds;
        let base = Self::new(kind);
        match kind {
            VariantKind::Walker
            | VariantKind::Crawler
            | VariantKind::Runner
            | VariantKind::Shambler
            | VariantKind::Mummy
            | VariantKind::Shadow
            | VariantKind::Skeleton => Self {
                ability_cooldown: secs(8),
                ..base
            },
            VariantKind::ArmoredElite => Self {
                ability_cooldown: secs(10),
                phase_thresholds: vec![0.5, 0.25],
                phase_transition: PhaseTransitionSpec {
                    damage_multiplier: 1.2,
                    speed_multiplier: 1.1,
                    heal_fraction: 0.0,
                    immunity_ticks: 0,
                    lockout_ticks: 20,
                },
                aggro_radius: 30.0,
                commit_ticks: 10,
                counter_chance: 0.2,
                counter_damage: 4.0,
                ..base
            },
            VariantKind::Butcher => Self {
                ability_cooldown: secs(8),
                special_cooldown: secs(15),
                phase_thresholds: vec![0.5, 0.2],
                aggro_radius: 40.0,
                detection_radius: 50.0,
                release_radius: 60.0,
                commit_ticks: 20,
                counter_chance: 0.15,
                counter_damage: 5.0,
                bonus_damage: 5.0,
                ..base
            },
            VariantKind::Gravedigger => Self {
                ability_cooldown: secs(8),
                special_cooldown: secs(15),
                phase_thresholds: vec![0.66, 0.33],
                aggro_radius: 40.0,
                leash_radius: Some(40.0),
                detection_radius: 45.0,
                release_radius: 55.0,
                max_minions: 6,
                commit_ticks: 20,
                vulnerable_ticks: 60,
                counter_chance: 0.1,
                counter_damage: 4.0,
                bonus_damage: 8.0,
                ..base
            },
            VariantKind::PatientZero => Self {
                ability_cooldown: secs(8),
                special_cooldown: secs(15),
                phase_thresholds: vec![0.75, 0.5, 0.25],
                aggro_radius: 40.0,
                detection_radius: 50.0,
                release_radius: 60.0,
                max_minions: 8,
                commit_ticks: 30,
                counter_chance: 0.15,
                counter_damage: 5.0,
                bonus_damage: 12.0,
                ..base
            },
            VariantKind::Necromancer => Self {
                ability_cooldown: secs(12),
                special_cooldown: 80,
                max_minions: 6,
                commit_ticks: 40,
                ..base
            },
            VariantKind::RabidWolf => Self {
                ability_cooldown: secs(4),
                special_cooldown: secs(15),
                pack_radius: 12.0,
                pack_cap: 5,
                ..base
            },
        }
    }

    pub fn variant(&self) -> Variant {
        Variant::new(self.category, self.kind)
    }

    pub fn has_participants(&self) -> bool {
        self.detection_radius > 0.0
    }

    /// Checks every structural constraint on the tuning data.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        let kind = self.kind;
        if self.category != kind.category() {
            return Err(DescriptorError::CategoryMismatch {
                kind,
                expected: kind.category(),
                declared: self.category,
            });
        }

        if self.phase_thresholds.len() > EngineConfig::MAX_PHASES {
            return Err(DescriptorError::TooManyPhases {
                kind,
                count: self.phase_thresholds.len(),
                max: EngineConfig::MAX_PHASES,
            });
        }
        for &value in &self.phase_thresholds {
            if !(value > 0.0 && value < 1.0) {
                return Err(DescriptorError::ThresholdOutOfRange { kind, value });
            }
        }
        for pair in self.phase_thresholds.windows(2) {
            if pair[1] >= pair[0] {
                return Err(DescriptorError::ThresholdsNotDecreasing {
                    kind,
                    previous: pair[0],
                    next: pair[1],
                });
            }
        }

        let transition = &self.phase_transition;
        for (field, value) in [
            ("damage_multiplier", transition.damage_multiplier),
            ("speed_multiplier", transition.speed_multiplier),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(DescriptorError::InvalidMultiplier { kind, field, value });
            }
        }
        for (field, value) in [
            ("heal_fraction", transition.heal_fraction),
            ("counter_chance", self.counter_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DescriptorError::InvalidProbability { kind, field, value });
            }
        }

        if self.has_participants() && self.release_radius < self.detection_radius {
            return Err(DescriptorError::ReleaseInsideDetection {
                kind,
                detection: self.detection_radius,
                release: self.release_radius,
            });
        }

        if let Some(radius) = self.leash_radius
            && !(radius > 0.0 && radius.is_finite())
        {
            return Err(DescriptorError::InvalidLeash { kind, radius });
        }

        Ok(())
    }
}

/// Validated descriptors keyed by kind.
#[derive(Clone, Debug, Default)]
pub struct DescriptorTable {
    entries: HashMap<VariantKind, Arc<BehaviorDescriptor>>,
}

impl DescriptorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding [`BehaviorDescriptor::standard`] for every kind.
    pub fn standard() -> Self {
        use strum::IntoEnumIterator;

        let entries = VariantKind::iter()
            .map(|kind| (kind, Arc::new(BehaviorDescriptor::standard(kind))))
            .collect();
        Self { entries }
    }

    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = BehaviorDescriptor>,
    ) -> Result<Self, DescriptorError> {
        let mut table = Self::new();
        for descriptor in descriptors {
            table.insert(descriptor)?;
        }
        Ok(table)
    }

    pub fn insert(&mut self, descriptor: BehaviorDescriptor) -> Result<(), DescriptorError> {
        descriptor.validate()?;
        if self.entries.contains_key(&descriptor.kind) {
            return Err(DescriptorError::Duplicate(descriptor.kind));
        }
        self.entries.insert(descriptor.kind, Arc::new(descriptor));
        Ok(())
    }

    /// Replaces (or adds) the descriptor for its kind.
    pub fn upsert(&mut self, descriptor: BehaviorDescriptor) -> Result<(), DescriptorError> {
        descriptor.validate()?;
        self.entries.insert(descriptor.kind, Arc::new(descriptor));
        Ok(())
    }

    pub fn get(&self, kind: VariantKind) -> Option<&Arc<BehaviorDescriptor>> {
        self.entries.get(&kind)
    }

    /// Descriptor for a variant tag, `None` when the tag is unrecognised.
    pub fn resolve(&self, variant: Variant) -> Option<Arc<BehaviorDescriptor>> {
        self.entries
            .get(&variant.kind)
            .filter(|descriptor| descriptor.category == variant.category)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BehaviorDescriptor> {
        self.entries.values().map(Arc::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn standard_table_is_valid_and_complete() {
        for kind in VariantKind::iter() {
            BehaviorDescriptor::standard(kind)
                .validate()
                .unwrap_or_else(|e| panic!("{kind}: {e}"));
        }
        assert_eq!(DescriptorTable::standard().len(), VariantKind::iter().count());
    }

    #[test]
    fn thresholds_must_decrease() {
        let mut descriptor = BehaviorDescriptor::standard(VariantKind::PatientZero);
        descriptor.phase_thresholds = vec![0.5, 0.5];
        assert!(matches!(
            descriptor.validate(),
            Err(DescriptorError::ThresholdsNotDecreasing { .. })
        ));

        descriptor.phase_thresholds = vec![1.0];
        assert!(matches!(
            descriptor.validate(),
            Err(DescriptorError::ThresholdOutOfRange { .. })
        ));
    }

    #[test]
    fn release_radius_must_cover_detection() {
        let mut descriptor = BehaviorDescriptor::standard(VariantKind::Butcher);
        descriptor.release_radius = 10.0;
        assert!(matches!(
            descriptor.validate(),
            Err(DescriptorError::ReleaseInsideDetection { .. })
        ));
    }

    #[test]
    fn category_mismatch_rejected() {
        let mut descriptor = BehaviorDescriptor::new(VariantKind::Walker);
        descriptor.category = Category::Elite;
        assert!(matches!(
            descriptor.validate(),
            Err(DescriptorError::CategoryMismatch { .. })
        ));
    }

    #[test]
    fn duplicates_rejected_but_upsert_replaces() {
        let mut table = DescriptorTable::new();
        table.insert(BehaviorDescriptor::new(VariantKind::Walker)).unwrap();
        assert_eq!(
            table.insert(BehaviorDescriptor::new(VariantKind::Walker)),
            Err(DescriptorError::Duplicate(VariantKind::Walker))
        );

        let mut tuned = BehaviorDescriptor::new(VariantKind::Walker);
        tuned.ability_cooldown = 7;
        table.upsert(tuned).unwrap();
        assert_eq!(table.get(VariantKind::Walker).unwrap().ability_cooldown, 7);
    }

    #[test]
    fn resolve_requires_matching_category() {
        let table = DescriptorTable::standard();
        assert!(table.resolve(Variant::of(VariantKind::Necromancer)).is_some());
        assert!(
            table
                .resolve(Variant::new(Category::Basic, VariantKind::Necromancer))
                .is_none()
        );
    }
}
