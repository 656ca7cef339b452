//! Vantage scoring engine.
//!
//! Pure functions that turn risk-register records (scenarios, controls,
//! treatment plans) into inherent, current and residual risk, and survey
//! questions into completion and findings statistics. Callers supply the
//! full current snapshot on every call; nothing is cached or persisted.

pub mod classify;
pub mod completion;
pub mod controls;
pub mod error;
pub mod findings;
pub mod register;
pub mod scales;
pub mod survey;
pub mod treatment;

pub use classify::{RiskLevel, RiskRating, classify};
pub use completion::{CompletionReport, Progress, completion_report, is_complete, progress, visible_progress};
pub use controls::{Control, ControlType, CurrentRisk, PrimaryEffect, current_risk};
pub use error::EngineError;
pub use findings::{FindingsReport, findings};
pub use register::{RegisterRow, RiskRegister, RiskScenario, TreatmentDecision, assess_scenario, build_register};
pub use scales::{ImpactLevel, LikelihoodLevel, Rating, Scale};
pub use survey::{SurveyQuestion, Visibility};
pub use treatment::{MitigationEffect, ResidualRisk, TreatmentPlan, mitigation_effects, residual_risk};
