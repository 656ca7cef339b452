use clap::Subcommand;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use vantage_core::classify::{RiskBand, RiskRating, classify, risk_bands};
use vantage_core::controls::Control;
use vantage_core::error::EngineError;
use vantage_core::register::{RegisterRow, RiskRegister, RiskScenario, assess_scenario, build_register};
use vantage_core::scales::{
    ImpactLevel, LikelihoodLevel, Scale, ScaleEntry, effectiveness_table, scale_table,
};
use vantage_core::treatment::TreatmentPlan;

use crate::util::{api_request, load_json_or_exit, parse_snapshot, print_result, render};

#[derive(Subcommand)]
pub enum RiskCommands {
    /// Score a likelihood/impact pair
    Classify {
        /// Likelihood key (e.g. "high") or weight 1-5
        #[arg(long)]
        likelihood: String,
        /// Impact key (e.g. "major") or weight 1-5
        #[arg(long)]
        impact: String,
        /// Send to the API instead of computing locally
        #[arg(long)]
        remote: bool,
    },
    /// Assess one scenario: inherent, current and residual risk
    Assess {
        /// JSON file with {scenario, controls, treatment_plans} (use '-' for stdin)
        #[arg(long)]
        file: String,
        /// Send to the API instead of computing locally
        #[arg(long)]
        remote: bool,
    },
    /// Build the full risk register with its summary
    Register {
        /// JSON file with {scenarios, controls, treatment_plans} (use '-' for stdin)
        #[arg(long)]
        file: String,
        /// Send to the API instead of computing locally
        #[arg(long)]
        remote: bool,
    },
    /// List likelihood, impact and effectiveness scales with risk-level bands
    Scales {
        /// Fetch from the API instead of the built-in tables
        #[arg(long)]
        remote: bool,
    },
}

pub async fn run(api_url: &str, raw: bool, command: RiskCommands) -> i32 {
    match command {
        RiskCommands::Classify {
            likelihood,
            impact,
            remote,
        } => {
            if remote {
                let body = json!({"likelihood": likelihood, "impact": impact});
                return api_request(api_url, reqwest::Method::POST, "/v1/risk/classify", Some(body), raw)
                    .await;
            }
            match classify_local(&likelihood, &impact) {
                Ok(result) => print_result(&result, raw),
                Err(err) => engine_error(&err, raw),
            }
        }
        RiskCommands::Assess { file, remote } => {
            let snapshot = load_json_or_exit(&file);
            if remote {
                return api_request(api_url, reqwest::Method::POST, "/v1/risk/assess", Some(snapshot), raw)
                    .await;
            }
            match parse_snapshot::<AssessSnapshot>(&file, snapshot, raw) {
                Ok(snapshot) => print_result(&assess_local(&snapshot), raw),
                Err(code) => code,
            }
        }
        RiskCommands::Register { file, remote } => {
            let snapshot = load_json_or_exit(&file);
            if remote {
                return api_request(api_url, reqwest::Method::POST, "/v1/risk/register", Some(snapshot), raw)
                    .await;
            }
            match parse_snapshot::<RegisterSnapshot>(&file, snapshot, raw) {
                Ok(snapshot) => {
                    let register = register_local(&snapshot);
                    tracing::debug!(
                        rows = register.summary.total,
                        needs_attention = register.summary.needs_attention,
                        "register computed"
                    );
                    print_result(&register, raw)
                }
                Err(code) => code,
            }
        }
        RiskCommands::Scales { remote } => {
            if remote {
                return api_request(api_url, reqwest::Method::GET, "/v1/scales", None, raw).await;
            }
            print_result(&scales_local(), raw)
        }
    }
}

#[derive(Debug, Deserialize)]
struct AssessSnapshot {
    scenario: RiskScenario,
    #[serde(default)]
    controls: Vec<Control>,
    #[serde(default)]
    treatment_plans: Vec<TreatmentPlan>,
}

#[derive(Debug, Deserialize)]
struct RegisterSnapshot {
    scenarios: Vec<RiskScenario>,
    #[serde(default)]
    controls: Vec<Control>,
    #[serde(default)]
    treatment_plans: Vec<TreatmentPlan>,
}

#[derive(Debug, Serialize)]
struct Classification {
    likelihood: LikelihoodLevel,
    impact: ImpactLevel,
    #[serde(flatten)]
    rating: RiskRating,
}

#[derive(Debug, Serialize)]
struct Scales {
    likelihood: Vec<ScaleEntry>,
    impact: Vec<ScaleEntry>,
    effectiveness: Vec<ScaleEntry>,
    risk_levels: Vec<RiskBand>,
}

fn classify_local(likelihood: &str, impact: &str) -> Result<Classification, EngineError> {
    let likelihood = LikelihoodLevel::parse(likelihood)?;
    let impact = ImpactLevel::parse(impact)?;
    Ok(Classification {
        likelihood,
        impact,
        rating: classify(likelihood, impact),
    })
}

fn assess_local(snapshot: &AssessSnapshot) -> RegisterRow {
    assess_scenario(&snapshot.scenario, &snapshot.controls, &snapshot.treatment_plans)
}

fn register_local(snapshot: &RegisterSnapshot) -> RiskRegister {
    build_register(&snapshot.scenarios, &snapshot.controls, &snapshot.treatment_plans)
}

fn scales_local() -> Scales {
    Scales {
        likelihood: scale_table::<LikelihoodLevel>(),
        impact: scale_table::<ImpactLevel>(),
        effectiveness: effectiveness_table(),
        risk_levels: risk_bands(),
    }
}

fn engine_error_body(err: &EngineError) -> Value {
    let received = match err {
        EngineError::InvalidLevelKey { key, .. } => json!(key),
        EngineError::OutOfRangeRating { value, .. } => json!(value),
    };
    json!({
        "error": vantage_core::error::codes::VALIDATION_FAILED,
        "error_code": err.code(),
        "message": err.to_string(),
        "field": err.field(),
        "received": received,
        "docs_hint": "Run `vantage risk scales` for the accepted keys and weights."
    })
}

fn engine_error(err: &EngineError, raw: bool) -> i32 {
    eprintln!("{}", render(&engine_error_body(err), raw));
    1
}
