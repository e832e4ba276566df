//! Status and classification enums for catalog entities.
//!
//! Each enum serializes to the human-readable label used by the remote
//! source (`"Coming Soon"`, `"Maker"`, ...). `FromStr` is lenient about case
//! and surrounding whitespace because labels are typed in by hand upstream.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A label did not match any known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownLabel {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl UnknownLabel {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Normalize a label for comparison: trimmed, lowercase, `_`/`-` as spaces.
pub(crate) fn normalize_label(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect::<String>()
        .to_lowercase()
}

/// Availability of a listed product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProductStatus {
    #[serde(rename = "Coming Soon")]
    ComingSoon,
    #[default]
    Available,
    #[serde(rename = "Sold Out")]
    SoldOut,
}

impl ProductStatus {
    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ComingSoon => "Coming Soon",
            Self::Available => "Available",
            Self::SoldOut => "Sold Out",
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "coming soon" => Ok(Self::ComingSoon),
            "available" => Ok(Self::Available),
            "sold out" => Ok(Self::SoldOut),
            _ => Err(UnknownLabel::new("product status", s)),
        }
    }
}

/// Community standing of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UserBadge {
    #[default]
    Member,
    Contributor,
    Maker,
}

impl UserBadge {
    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Member => "Member",
            Self::Contributor => "Contributor",
            Self::Maker => "Maker",
        }
    }
}

impl std::fmt::Display for UserBadge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for UserBadge {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "member" => Ok(Self::Member),
            "contributor" => Ok(Self::Contributor),
            "maker" => Ok(Self::Maker),
            _ => Err(UnknownLabel::new("user badge", s)),
        }
    }
}

/// Skill level a product is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SkillLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }
}

impl std::fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for SkillLevel {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            _ => Err(UnknownLabel::new("skill level", s)),
        }
    }
}

/// Movement of a product on the leaderboard since the previous reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Same,
}
