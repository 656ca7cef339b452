//! Controls attached to risk scenarios and the existing-control aggregation
//! that turns inherent risk into current risk.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::classify::{RiskRating, classify};
use crate::scales::{ImpactLevel, LikelihoodLevel, Rating, Scale};

/// Whether a control is already in place or only planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ControlType {
    Existing,
    Proposed,
}

/// The risk dimension a mitigation acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryEffect {
    ReduceLikelihood,
    ReduceImpact,
}

/// A security control linked to a threat scenario.
///
/// `effectiveness` only matters for existing controls; `primary_effect` and
/// `treatment_effectiveness` only matter for proposed ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Control {
    pub id: String,
    pub scenario_id: String,
    #[serde(default)]
    pub vulnerability_id: Option<String>,
    pub control_type: ControlType,
    #[serde(default)]
    pub description: String,
    /// 1-5, null when not yet rated. Null is ignored, never read as 0.
    #[serde(default)]
    pub effectiveness: Option<Rating>,
    /// Free-form treatment category (e.g. "technical", "procedural")
    #[serde(default)]
    pub treatment_type: Option<String>,
    #[serde(default)]
    pub primary_effect: Option<PrimaryEffect>,
    #[serde(default)]
    pub treatment_effectiveness: Option<Rating>,
}

impl Control {
    pub fn is_existing(&self) -> bool {
        self.control_type == ControlType::Existing
    }

    pub fn is_proposed(&self) -> bool {
        self.control_type == ControlType::Proposed
    }
}

/// Risk after the controls already in place are taken into account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CurrentRisk {
    pub current_likelihood_float: f64,
    pub current_impact_float: f64,
    pub current_likelihood: LikelihoodLevel,
    pub current_impact: ImpactLevel,
    pub rating: RiskRating,
    /// Mean effectiveness x 10, so a mean of 5 caps the reduction at 50%.
    pub likelihood_reduction_percent: f64,
    /// Existing controls that carried an effectiveness rating.
    pub rated_controls: usize,
}

/// Derive current risk from inherent risk and the existing controls.
///
/// Only existing controls with an effectiveness rating take part; proposed
/// controls and unrated ones are skipped. Impact is never reduced here.
/// The likelihood reduction is `floor(L * meanEffectiveness * 10 / 100)`,
/// computed in integers, and the result never drops below 1.
pub fn current_risk<'a>(
    inherent_likelihood: LikelihoodLevel,
    inherent_impact: ImpactLevel,
    controls: impl IntoIterator<Item = &'a Control>,
) -> CurrentRisk {
    let (sum, count) = controls
        .into_iter()
        .filter(|c| c.is_existing())
        .filter_map(|c| c.effectiveness)
        .fold((0u32, 0u32), |(sum, count), rating| {
            (sum + u32::from(rating.get()), count + 1)
        });

    let likelihood = inherent_likelihood.weight();
    if count == 0 {
        return CurrentRisk {
            current_likelihood_float: f64::from(likelihood),
            current_impact_float: f64::from(inherent_impact.weight()),
            current_likelihood: inherent_likelihood,
            current_impact: inherent_impact,
            rating: classify(inherent_likelihood, inherent_impact),
            likelihood_reduction_percent: 0.0,
            rated_controls: 0,
        };
    }

    let reduction = (u32::from(likelihood) * sum) / (count * 10);
    let reduced = u32::from(likelihood).saturating_sub(reduction).max(1);
    let current_likelihood = LikelihoodLevel::from_fractional_weight(f64::from(reduced));

    CurrentRisk {
        current_likelihood_float: f64::from(reduced),
        current_impact_float: f64::from(inherent_impact.weight()),
        current_likelihood,
        current_impact: inherent_impact,
        rating: classify(current_likelihood, inherent_impact),
        likelihood_reduction_percent: f64::from(sum * 10) / f64::from(count),
        rated_controls: count as usize,
    }
}
