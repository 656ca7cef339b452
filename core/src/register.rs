//! Risk register: runs inherent -> current -> residual for each scenario and
//! rolls the rows up into severity counts.
//!
//! Rows are derived on every call from the scenario, its controls and its
//! treatment plans. Nothing here is cached between calls.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::classify::{RiskLevel, RiskRating, classify};
use crate::controls::{Control, CurrentRisk, current_risk};
use crate::scales::{ImpactLevel, LikelihoodLevel};
use crate::treatment::{
    MitigationEffect, ResidualRisk, TreatmentPlan, mitigation_effects, residual_risk,
};

/// What the organisation decided to do about a scenario.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentDecision {
    #[default]
    Undecided,
    Accept,
    Transfer,
    Remediate,
}

impl TreatmentDecision {
    pub const ALL: [TreatmentDecision; 4] = [
        TreatmentDecision::Undecided,
        TreatmentDecision::Accept,
        TreatmentDecision::Transfer,
        TreatmentDecision::Remediate,
    ];
}

/// A threat against an asset, rated by likelihood and impact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RiskScenario {
    pub id: String,
    pub asset_id: String,
    pub threat_type: String,
    #[serde(default)]
    pub threat_description: String,
    pub likelihood: LikelihoodLevel,
    pub impact: ImpactLevel,
    #[serde(default)]
    pub decision: TreatmentDecision,
}

/// One derived row of the risk register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RegisterRow {
    pub scenario_id: String,
    pub asset_id: String,
    pub threat_type: String,
    pub decision: TreatmentDecision,
    pub inherent: RiskRating,
    pub current: CurrentRisk,
    pub residual: ResidualRisk,
    /// The reductions that produced `residual`, in application order.
    pub mitigations: Vec<MitigationEffect>,
}

impl RegisterRow {
    /// Undecided rows whose residual risk is still High or Critical.
    pub fn needs_attention(&self) -> bool {
        self.decision == TreatmentDecision::Undecided && self.residual.rating.level.needs_attention()
    }
}

/// Assess one scenario. Controls and plans for other scenarios are ignored.
pub fn assess_scenario(
    scenario: &RiskScenario,
    controls: &[Control],
    treatment_plans: &[TreatmentPlan],
) -> RegisterRow {
    let own_controls: Vec<&Control> = controls
        .iter()
        .filter(|c| c.scenario_id == scenario.id)
        .collect();
    let own_plans = treatment_plans.iter().filter(|p| p.scenario_id == scenario.id);

    let inherent = classify(scenario.likelihood, scenario.impact);
    let current = current_risk(scenario.likelihood, scenario.impact, own_controls.iter().copied());
    let mitigations = mitigation_effects(own_controls.iter().copied(), own_plans);
    let residual = residual_risk(
        current.current_likelihood_float,
        current.current_impact_float,
        &mitigations,
    );

    RegisterRow {
        scenario_id: scenario.id.clone(),
        asset_id: scenario.asset_id.clone(),
        threat_type: scenario.threat_type.clone(),
        decision: scenario.decision,
        inherent,
        current,
        residual,
        mitigations,
    }
}

/// Row count for one risk level at inherent, current and residual stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LevelCount {
    pub level: RiskLevel,
    pub inherent: usize,
    pub current: usize,
    pub residual: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DecisionCount {
    pub decision: TreatmentDecision,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RegisterSummary {
    pub total: usize,
    /// One entry per level, Very Low first.
    pub by_level: Vec<LevelCount>,
    pub by_decision: Vec<DecisionCount>,
    pub needs_attention: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RiskRegister {
    pub rows: Vec<RegisterRow>,
    pub summary: RegisterSummary,
}

/// Assess every scenario, in input order, and summarise the result.
pub fn build_register(
    scenarios: &[RiskScenario],
    controls: &[Control],
    treatment_plans: &[TreatmentPlan],
) -> RiskRegister {
    let rows: Vec<RegisterRow> = scenarios
        .iter()
        .map(|scenario| assess_scenario(scenario, controls, treatment_plans))
        .collect();
    let summary = summarize(&rows);
    RiskRegister { rows, summary }
}

pub fn summarize(rows: &[RegisterRow]) -> RegisterSummary {
    let by_level = RiskLevel::ALL
        .into_iter()
        .map(|level| LevelCount {
            level,
            inherent: rows.iter().filter(|r| r.inherent.level == level).count(),
            current: rows.iter().filter(|r| r.current.rating.level == level).count(),
            residual: rows.iter().filter(|r| r.residual.rating.level == level).count(),
        })
        .collect();

    let by_decision = TreatmentDecision::ALL
        .into_iter()
        .map(|decision| DecisionCount {
            decision,
            count: rows.iter().filter(|r| r.decision == decision).count(),
        })
        .collect();

    RegisterSummary {
        total: rows.len(),
        by_level,
        by_decision,
        needs_attention: rows.iter().filter(|r| r.needs_attention()).count(),
    }
}
