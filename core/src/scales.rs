//! Rating scales: the categorical likelihood and impact levels, their
//! integer weights, and the 1-5 control effectiveness rating.
//!
//! Weights are unique per scale, so the reverse lookup from weight to level
//! is exact. Unknown keys fail with [`EngineError::InvalidLevelKey`]; nothing
//! here ever falls back to a zero weight.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::EngineError;

pub const MIN_WEIGHT: u8 = 1;
pub const MAX_WEIGHT: u8 = 5;

/// Absorbs float drift (e.g. `3.0 * 0.7 == 2.0999999999999996`) before rounding.
const ROUNDING_EPSILON: f64 = 1e-9;

/// A five-step categorical scale whose levels map onto weights 1..=5.
pub trait Scale: Copy + Eq + Sized + 'static {
    /// Scale name used in error messages ("likelihood", "impact").
    const NAME: &'static str;
    /// Every level, ordered by ascending weight.
    const ALL: [Self; 5];

    fn key(self) -> &'static str;
    fn label(self) -> &'static str;
    fn description(self) -> &'static str;
    fn weight(self) -> u8;

    /// Exact reverse lookup. Weights outside 1..=5 are rejected.
    fn from_weight(weight: u8) -> Result<Self, EngineError> {
        if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&weight) {
            return Err(EngineError::OutOfRangeRating {
                field: Self::NAME,
                value: i64::from(weight),
            });
        }
        Ok(Self::ALL[usize::from(weight - MIN_WEIGHT)])
    }

    /// Look a level up by key. Accepts `very-low`, `very_low` and `Very Low`.
    fn from_key(key: &str) -> Result<Self, EngineError> {
        let normalized = normalize_key(key);
        Self::ALL
            .into_iter()
            .find(|level| level.key() == normalized)
            .ok_or_else(|| EngineError::InvalidLevelKey {
                scale: Self::NAME,
                key: key.to_string(),
            })
    }

    /// Parse either a level key (`"high"`) or a weight (`"4"`).
    fn parse(raw: &str) -> Result<Self, EngineError> {
        match raw.trim().parse::<i64>() {
            Ok(weight) => u8::try_from(weight)
                .map_err(|_| EngineError::OutOfRangeRating {
                    field: Self::NAME,
                    value: weight,
                })
                .and_then(Self::from_weight),
            Err(_) => Self::from_key(raw),
        }
    }

    /// Level for a fractional weight, rounded half-up and held inside 1..=5.
    fn from_fractional_weight(value: f64) -> Self {
        Self::ALL[usize::from(round_weight(value) - MIN_WEIGHT)]
    }
}

/// Round a fractional weight half-up into 1..=5.
///
/// This is the single rounding rule used wherever a reduced likelihood or
/// impact is turned back into a level.
pub fn round_weight(value: f64) -> u8 {
    let rounded = (value + 0.5 + ROUNDING_EPSILON)
        .floor()
        .clamp(f64::from(MIN_WEIGHT), f64::from(MAX_WEIGHT));
    // NaN casts to 0
    (rounded as u8).max(MIN_WEIGHT)
}

fn normalize_key(key: &str) -> String {
    key.trim()
        .to_ascii_lowercase()
        .replace(['_', ' '], "-")
}

/// How probable a threat scenario is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum LikelihoodLevel {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Scale for LikelihoodLevel {
    const NAME: &'static str = "likelihood";
    const ALL: [Self; 5] = [
        LikelihoodLevel::VeryLow,
        LikelihoodLevel::Low,
        LikelihoodLevel::Medium,
        LikelihoodLevel::High,
        LikelihoodLevel::VeryHigh,
    ];

    fn key(self) -> &'static str {
        match self {
            LikelihoodLevel::VeryLow => "very-low",
            LikelihoodLevel::Low => "low",
            LikelihoodLevel::Medium => "medium",
            LikelihoodLevel::High => "high",
            LikelihoodLevel::VeryHigh => "very-high",
        }
    }

    fn label(self) -> &'static str {
        match self {
            LikelihoodLevel::VeryLow => "Very Low",
            LikelihoodLevel::Low => "Low",
            LikelihoodLevel::Medium => "Medium",
            LikelihoodLevel::High => "High",
            LikelihoodLevel::VeryHigh => "Very High",
        }
    }

    fn description(self) -> &'static str {
        match self {
            LikelihoodLevel::VeryLow => "Rare: may occur only in exceptional circumstances",
            LikelihoodLevel::Low => "Unlikely: could occur at some time",
            LikelihoodLevel::Medium => "Possible: might occur at some time",
            LikelihoodLevel::High => "Likely: will probably occur in most circumstances",
            LikelihoodLevel::VeryHigh => "Almost certain: expected to occur in most circumstances",
        }
    }

    fn weight(self) -> u8 {
        match self {
            LikelihoodLevel::VeryLow => 1,
            LikelihoodLevel::Low => 2,
            LikelihoodLevel::Medium => 3,
            LikelihoodLevel::High => 4,
            LikelihoodLevel::VeryHigh => 5,
        }
    }
}

/// How severe the consequences of a threat scenario are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ImpactLevel {
    Negligible,
    Minor,
    Moderate,
    Major,
    Catastrophic,
}

impl Scale for ImpactLevel {
    const NAME: &'static str = "impact";
    const ALL: [Self; 5] = [
        ImpactLevel::Negligible,
        ImpactLevel::Minor,
        ImpactLevel::Moderate,
        ImpactLevel::Major,
        ImpactLevel::Catastrophic,
    ];

    fn key(self) -> &'static str {
        match self {
            ImpactLevel::Negligible => "negligible",
            ImpactLevel::Minor => "minor",
            ImpactLevel::Moderate => "moderate",
            ImpactLevel::Major => "major",
            ImpactLevel::Catastrophic => "catastrophic",
        }
    }

    fn label(self) -> &'static str {
        match self {
            ImpactLevel::Negligible => "Negligible",
            ImpactLevel::Minor => "Minor",
            ImpactLevel::Moderate => "Moderate",
            ImpactLevel::Major => "Major",
            ImpactLevel::Catastrophic => "Catastrophic",
        }
    }

    fn description(self) -> &'static str {
        match self {
            ImpactLevel::Negligible => "Minimal disruption, no injuries, negligible loss",
            ImpactLevel::Minor => "Short disruption, first-aid injuries, small loss",
            ImpactLevel::Moderate => "Noticeable disruption, medical treatment, moderate loss",
            ImpactLevel::Major => "Extended disruption, serious injuries, major loss",
            ImpactLevel::Catastrophic => "Loss of operations or life, severe financial loss",
        }
    }

    fn weight(self) -> u8 {
        match self {
            ImpactLevel::Negligible => 1,
            ImpactLevel::Minor => 2,
            ImpactLevel::Moderate => 3,
            ImpactLevel::Major => 4,
            ImpactLevel::Catastrophic => 5,
        }
    }
}

macro_rules! scale_text_impls {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.key())
            }
        }

        impl FromStr for $ty {
            type Err = EngineError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty as Scale>::from_key(s)
            }
        }
    };
}

scale_text_impls!(LikelihoodLevel);
scale_text_impls!(ImpactLevel);

const EFFECTIVENESS_KEYS: [&str; 5] = ["minimal", "limited", "moderate", "strong", "very-strong"];

/// A 1-5 rating for control effectiveness or treatment effectiveness.
///
/// Construction rejects anything outside 1..=5, including during
/// deserialization, so aggregators only ever see valid ratings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Default treatment effectiveness when a proposed control omits one.
    pub const MODERATE: Rating = Rating(3);

    pub fn new(value: i64, field: &'static str) -> Result<Self, EngineError> {
        if (i64::from(MIN_WEIGHT)..=i64::from(MAX_WEIGHT)).contains(&value) {
            Ok(Rating(value as u8))
        } else {
            Err(EngineError::OutOfRangeRating { field, value })
        }
    }

    /// Parse a digit (`"4"`) or a label (`"strong"`).
    pub fn from_key(key: &str) -> Result<Self, EngineError> {
        let normalized = normalize_key(key);
        if let Ok(value) = normalized.parse::<i64>() {
            return Rating::new(value, "effectiveness");
        }
        EFFECTIVENESS_KEYS
            .iter()
            .position(|k| *k == normalized)
            .map(|idx| Rating(idx as u8 + MIN_WEIGHT))
            .ok_or_else(|| EngineError::InvalidLevelKey {
                scale: "effectiveness",
                key: key.to_string(),
            })
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Reduction this rating stands for: 1 -> 10% ... 5 -> 50%.
    pub fn percent(self) -> f64 {
        f64::from(self.0) * 10.0
    }

    pub fn key(self) -> &'static str {
        EFFECTIVENESS_KEYS[usize::from(self.0 - MIN_WEIGHT)]
    }

    pub fn all() -> impl Iterator<Item = Rating> {
        (MIN_WEIGHT..=MAX_WEIGHT).map(Rating)
    }
}

impl TryFrom<i64> for Rating {
    type Error = EngineError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Rating::new(value, "rating")
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl FromStr for Rating {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rating::from_key(s)
    }
}

/// One row of a published scale table.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScaleEntry {
    pub key: &'static str,
    pub weight: u8,
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
}

/// Every level of `S` as table rows, lowest weight first.
pub fn scale_table<S: Scale>() -> Vec<ScaleEntry> {
    S::ALL
        .into_iter()
        .map(|level| ScaleEntry {
            key: level.key(),
            weight: level.weight(),
            label: level.label(),
            description: Some(level.description()),
        })
        .collect()
}

pub fn effectiveness_table() -> Vec<ScaleEntry> {
    Rating::all()
        .map(|rating| ScaleEntry {
            key: rating.key(),
            weight: rating.get(),
            label: rating.key(),
            description: None,
        })
        .collect()
}
