//! Variant tags: the closed set of creature categories and kinds.
//!
//! A [`Variant`] pairs a [`Category`] (which behaviour family drives the
//! creature) with a [`VariantKind`] (which concrete creature it is). Every kind
//! has exactly one home category; a tag that pairs a kind with a foreign
//! category is treated as unrecognised by the manager.

use core::fmt;

/// Behaviour family of a creature.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Category {
    /// Common creatures with one simple trick
    Basic,
    /// Tougher creatures with a short phase ladder
    Elite,
    /// Small encounter boss
    MiniBoss,
    /// Regional encounter boss
    ZoneBoss,
    /// End-of-journey encounter boss
    FinalBoss,
    /// Creatures that raise and command minions
    Summoner,
    /// Creatures that grow stronger in groups
    Pack,
}

impl Category {
    /// True for the three boss tiers.
    pub const fn is_boss(self) -> bool {
        matches!(self, Self::MiniBoss | Self::ZoneBoss | Self::FinalBoss)
    }
}

/// Concrete creature kind.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum VariantKind {
    Walker,
    Crawler,
    Runner,
    Shambler,
    Mummy,
    /// Raised by summoners during a dark ritual
    Shadow,
    /// Raised by bosses
    Skeleton,
    ArmoredElite,
    Butcher,
    Gravedigger,
    PatientZero,
    Necromancer,
    RabidWolf,
}

impl VariantKind {
    /// The only category this kind may be registered under.
    pub const fn category(self) -> Category {
        match self {
            Self::Walker
            | Self::Crawler
            | Self::Runner
            | Self::Shambler
            | Self::Mummy
            | Self::Shadow
            | Self::Skeleton => Category::Basic,
            Self::ArmoredElite => Category::Elite,
            Self::Butcher => Category::MiniBoss,
            Self::Gravedigger => Category::ZoneBoss,
            Self::PatientZero => Category::FinalBoss,
            Self::Necromancer => Category::Summoner,
            Self::RabidWolf => Category::Pack,
        }
    }

    /// Human-readable name used in announcements and encounter bars.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Walker => "Walker",
            Self::Crawler => "Crawler",
            Self::Runner => "Runner",
            Self::Shambler => "Shambler",
            Self::Mummy => "Mummy",
            Self::Shadow => "Shadow",
            Self::Skeleton => "Skeleton",
            Self::ArmoredElite => "Armored Elite",
            Self::Butcher => "The Butcher",
            Self::Gravedigger => "The Gravedigger",
            Self::PatientZero => "Patient Zero",
            Self::Necromancer => "Necromancer",
            Self::RabidWolf => "Rabid Wolf",
        }
    }
}

/// Category × kind tag assigned to a creature at spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variant {
    pub category: Category,
    pub kind: VariantKind,
}

impl Variant {
    pub const fn new(category: Category, kind: VariantKind) -> Self {
        Self { category, kind }
    }

    /// Tag for a kind under its home category.
    pub const fn of(kind: VariantKind) -> Self {
        Self {
            category: kind.category(),
            kind,
        }
    }

    /// Whether the category matches the kind's home category.
    pub fn is_consistent(&self) -> bool {
        self.kind.category() == self.category
    }
}

impl From<VariantKind> for Variant {
    fn from(kind: VariantKind) -> Self {
        Variant::of(kind)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn every_kind_has_a_home_category() {
        for kind in VariantKind::iter() {
            assert!(Variant::of(kind).is_consistent(), "{kind}");
        }
    }

    #[test]
    fn foreign_category_is_inconsistent() {
        let variant = Variant::new(Category::Basic, VariantKind::Butcher);
        assert!(!variant.is_consistent());
    }

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!(
            VariantKind::from_str("Rabid_Wolf").ok(),
            Some(VariantKind::RabidWolf)
        );
        assert_eq!(Category::from_str("zone_boss").ok(), Some(Category::ZoneBoss));
        assert_eq!(Variant::of(VariantKind::Gravedigger).to_string(), "zone_boss/gravedigger");
    }

    #[test]
    fn boss_tiers() {
        let bosses: Vec<_> = Category::iter().filter(|c| c.is_boss()).collect();
        assert_eq!(
            bosses,
            vec![Category::MiniBoss, Category::ZoneBoss, Category::FinalBoss]
        );
    }
}
