//! Proposed mitigations and the aggregation that turns current risk into
//! residual risk.
//!
//! Two mitigation shapes exist: multi-control `Control { control_type:
//! proposed }` rows, and the older one-plan-per-scenario `TreatmentPlan`.
//! Both reduce to a [`MitigationEffect`] before aggregation, so the
//! arithmetic lives in one place.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::classify::{RiskRating, classify};
use crate::controls::{Control, PrimaryEffect};
use crate::scales::{ImpactLevel, LikelihoodLevel, MIN_WEIGHT, Rating, Scale};

/// Legacy treatment plan: one effect and one 1-5 value per scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TreatmentPlan {
    pub id: String,
    pub scenario_id: String,
    pub effect: PrimaryEffect,
    /// Subtracted from the current weight as-is, not as a percentage.
    pub value: Rating,
}

/// A single reduction applied to one risk dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MitigationEffect {
    /// Fractional reduction from a proposed control. Several of these on the
    /// same dimension compound on whatever value remains.
    Percent { dimension: PrimaryEffect, percent: f64 },
    /// Absolute reduction from a legacy treatment plan.
    Amount { dimension: PrimaryEffect, amount: f64 },
}

impl MitigationEffect {
    /// Effect of a proposed control. Existing controls yield `None`.
    ///
    /// A missing `primary_effect` targets likelihood; a missing
    /// `treatment_effectiveness` counts as moderate (30%).
    pub fn from_control(control: &Control) -> Option<Self> {
        if !control.is_proposed() {
            return None;
        }
        let rating = control.treatment_effectiveness.unwrap_or(Rating::MODERATE);
        Some(MitigationEffect::Percent {
            dimension: control.primary_effect.unwrap_or(PrimaryEffect::ReduceLikelihood),
            percent: rating.percent(),
        })
    }

    pub fn from_plan(plan: &TreatmentPlan) -> Self {
        MitigationEffect::Amount {
            dimension: plan.effect,
            amount: f64::from(plan.value.get()),
        }
    }

    pub fn dimension(&self) -> PrimaryEffect {
        match self {
            MitigationEffect::Percent { dimension, .. } | MitigationEffect::Amount { dimension, .. } => {
                *dimension
            }
        }
    }

    /// Apply to a weight, never going below the minimum weight.
    pub fn apply(&self, value: f64) -> f64 {
        let reduced = match self {
            MitigationEffect::Percent { percent, .. } => value * (1.0 - percent / 100.0),
            MitigationEffect::Amount { amount, .. } => value - amount,
        };
        reduced.max(f64::from(MIN_WEIGHT))
    }
}

/// Collect the mitigation effects for one scenario.
///
/// Proposed controls win; the legacy plans are only used when no proposed
/// control is present.
pub fn mitigation_effects<'a>(
    controls: impl IntoIterator<Item = &'a Control>,
    plans: impl IntoIterator<Item = &'a TreatmentPlan>,
) -> Vec<MitigationEffect> {
    let from_controls: Vec<MitigationEffect> = controls
        .into_iter()
        .filter_map(MitigationEffect::from_control)
        .collect();
    if !from_controls.is_empty() {
        return from_controls;
    }
    plans.into_iter().map(MitigationEffect::from_plan).collect()
}

/// Risk projected after the proposed mitigations are implemented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResidualRisk {
    pub residual_likelihood_float: f64,
    pub residual_impact_float: f64,
    pub residual_likelihood: LikelihoodLevel,
    pub residual_impact: ImpactLevel,
    pub rating: RiskRating,
    pub applied_effects: usize,
}

/// Derive residual risk from current (possibly fractional) weights.
///
/// Effects are applied in order to the dimension they target. Resulting
/// weights are rounded half-up to pick the residual levels.
pub fn residual_risk(
    current_likelihood_float: f64,
    current_impact_float: f64,
    effects: &[MitigationEffect],
) -> ResidualRisk {
    let mut likelihood = current_likelihood_float;
    let mut impact = current_impact_float;

    for effect in effects {
        match effect.dimension() {
            PrimaryEffect::ReduceLikelihood => likelihood = effect.apply(likelihood),
            PrimaryEffect::ReduceImpact => impact = effect.apply(impact),
        }
    }

    let residual_likelihood = LikelihoodLevel::from_fractional_weight(likelihood);
    let residual_impact = ImpactLevel::from_fractional_weight(impact);

    ResidualRisk {
        residual_likelihood_float: likelihood,
        residual_impact_float: impact,
        residual_likelihood,
        residual_impact,
        rating: classify(residual_likelihood, residual_impact),
        applied_effects: effects.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::RiskLevel;
    use crate::controls::ControlType;

    fn rating(value: i64) -> Rating {
        Rating::new(value, "treatment_effectiveness").unwrap()
    }

    fn proposed(effect: PrimaryEffect, effectiveness: Option<i64>) -> Control {
        Control {
            id: "p".to_string(),
            scenario_id: "s1".to_string(),
            vulnerability_id: None,
            control_type: ControlType::Proposed,
            description: "Install badge readers".to_string(),
            effectiveness: None,
            treatment_type: Some("technical".to_string()),
            primary_effect: Some(effect),
            treatment_effectiveness: effectiveness.map(rating),
        }
    }

    fn plan(effect: PrimaryEffect, value: i64) -> TreatmentPlan {
        TreatmentPlan {
            id: "t1".to_string(),
            scenario_id: "s1".to_string(),
            effect,
            value: rating(value),
        }
    }

    fn no_plans() -> Vec<TreatmentPlan> {
        Vec::new()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    #[test]
    fn no_effects_returns_current_unchanged() {
        let residual = residual_risk(3.0, 4.0, &[]);
        assert_eq!(residual.residual_likelihood, LikelihoodLevel::Medium);
        assert_eq!(residual.residual_impact, ImpactLevel::Major);
        assert_eq!(residual.residual_likelihood_float, 3.0);
        assert_eq!(residual.rating, RiskRating { score: 12, level: RiskLevel::Medium });
    }

    #[test]
    fn moderate_control_rounds_half_up() {
        let effects = mitigation_effects(&[proposed(PrimaryEffect::ReduceLikelihood, Some(3))], &no_plans());
        let residual = residual_risk(3.0, 4.0, &effects);
        assert_close(residual.residual_likelihood_float, 2.1);
        assert_eq!(residual.residual_likelihood, LikelihoodLevel::Low);
        assert_eq!(residual.rating, RiskRating { score: 8, level: RiskLevel::Low });
    }

    #[test]
    fn two_strong_controls_compound_without_going_below_one() {
        let one = mitigation_effects(&[proposed(PrimaryEffect::ReduceLikelihood, Some(5))], &no_plans());
        let two = mitigation_effects(
            &[
                proposed(PrimaryEffect::ReduceLikelihood, Some(5)),
                proposed(PrimaryEffect::ReduceLikelihood, Some(5)),
            ],
            &no_plans(),
        );
        let single = residual_risk(5.0, 3.0, &one);
        let double = residual_risk(5.0, 3.0, &two);
        assert_eq!(single.residual_likelihood_float, 2.5);
        assert_eq!(double.residual_likelihood_float, 1.25);
        assert!(double.residual_likelihood_float < single.residual_likelihood_float);

        let floor = residual_risk(1.0, 3.0, &two);
        assert_eq!(floor.residual_likelihood_float, 1.0);
    }

    #[test]
    fn effects_target_their_own_dimension() {
        let effects = mitigation_effects(
            &[
                proposed(PrimaryEffect::ReduceImpact, Some(4)),
                proposed(PrimaryEffect::ReduceLikelihood, Some(2)),
            ],
            &no_plans(),
        );
        let residual = residual_risk(5.0, 5.0, &effects);
        assert_close(residual.residual_impact_float, 3.0);
        assert_close(residual.residual_likelihood_float, 4.0);
        assert_eq!(residual.residual_impact, ImpactLevel::Moderate);
    }

    #[test]
    fn missing_treatment_effectiveness_counts_as_moderate() {
        let effect = MitigationEffect::from_control(&proposed(PrimaryEffect::ReduceImpact, None));
        assert_eq!(
            effect,
            Some(MitigationEffect::Percent {
                dimension: PrimaryEffect::ReduceImpact,
                percent: 30.0
            })
        );
    }

    #[test]
    fn legacy_plan_subtracts_value_directly() {
        let plans = vec![plan(PrimaryEffect::ReduceLikelihood, 2)];
        let effects = mitigation_effects(&Vec::<Control>::new(), &plans);
        let residual = residual_risk(4.0, 4.0, &effects);
        assert_eq!(residual.residual_likelihood_float, 2.0);
        assert_eq!(residual.rating.score, 8);

        let big = vec![plan(PrimaryEffect::ReduceImpact, 5)];
        let residual = residual_risk(4.0, 4.0, &mitigation_effects(&Vec::<Control>::new(), &big));
        assert_eq!(residual.residual_impact_float, 1.0);
    }

    #[test]
    fn proposed_controls_take_precedence_over_legacy_plan() {
        let controls = vec![proposed(PrimaryEffect::ReduceLikelihood, Some(1))];
        let plans = vec![plan(PrimaryEffect::ReduceLikelihood, 5)];
        let effects = mitigation_effects(&controls, &plans);
        assert_eq!(effects.len(), 1);
        assert!(matches!(effects[0], MitigationEffect::Percent { .. }));
    }
}
