use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::EngineError;
use crate::scales::{ImpactLevel, LikelihoodLevel, Scale};

pub const CRITICAL_MIN_SCORE: u8 = 20;
pub const HIGH_MIN_SCORE: u8 = 15;
pub const MEDIUM_MIN_SCORE: u8 = 10;
pub const LOW_MIN_SCORE: u8 = 5;
pub const MAX_SCORE: u8 = 25;

/// Discrete risk bucket derived from a likelihood x impact score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    VeryLow,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 5] = [
        RiskLevel::VeryLow,
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    /// Thresholds are tested top-down; the first match wins.
    pub fn from_score(score: u8) -> Self {
        if score >= CRITICAL_MIN_SCORE {
            RiskLevel::Critical
        } else if score >= HIGH_MIN_SCORE {
            RiskLevel::High
        } else if score >= MEDIUM_MIN_SCORE {
            RiskLevel::Medium
        } else if score >= LOW_MIN_SCORE {
            RiskLevel::Low
        } else {
            RiskLevel::VeryLow
        }
    }

    /// Inclusive score band covered by this level.
    pub fn score_range(self) -> (u8, u8) {
        match self {
            RiskLevel::VeryLow => (1, LOW_MIN_SCORE - 1),
            RiskLevel::Low => (LOW_MIN_SCORE, MEDIUM_MIN_SCORE - 1),
            RiskLevel::Medium => (MEDIUM_MIN_SCORE, HIGH_MIN_SCORE - 1),
            RiskLevel::High => (HIGH_MIN_SCORE, CRITICAL_MIN_SCORE - 1),
            RiskLevel::Critical => (CRITICAL_MIN_SCORE, MAX_SCORE),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::VeryLow => "Very Low",
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }

    /// High and Critical risks need a treatment decision.
    pub fn needs_attention(self) -> bool {
        self >= RiskLevel::High
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Score and level for one (likelihood, impact) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RiskRating {
    /// likelihood weight x impact weight, always within 1..=25
    pub score: u8,
    pub level: RiskLevel,
}

/// Classify a likelihood/impact pair. Total over all 25 combinations.
pub fn classify(likelihood: LikelihoodLevel, impact: ImpactLevel) -> RiskRating {
    let score = likelihood.weight() * impact.weight();
    RiskRating {
        score,
        level: RiskLevel::from_score(score),
    }
}

/// Classify raw weights, rejecting anything outside 1..=5.
pub fn classify_weights(likelihood_weight: u8, impact_weight: u8) -> Result<RiskRating, EngineError> {
    Ok(classify(
        LikelihoodLevel::from_weight(likelihood_weight)?,
        ImpactLevel::from_weight(impact_weight)?,
    ))
}

/// Published score band for a level.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RiskBand {
    pub level: RiskLevel,
    pub label: &'static str,
    pub min_score: u8,
    pub max_score: u8,
}

pub fn risk_bands() -> Vec<RiskBand> {
    RiskLevel::ALL
        .into_iter()
        .map(|level| {
            let (min_score, max_score) = level.score_range();
            RiskBand {
                level,
                label: level.label(),
                min_score,
                max_score,
            }
        })
        .collect()
}
