use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use vantage_core::classify::{RiskRating, classify};
use vantage_core::controls::Control;
use vantage_core::error::ApiError;
use vantage_core::register::{RegisterRow, RegisterSummary, RiskScenario, assess_scenario, build_register};
use vantage_core::scales::{ImpactLevel, LikelihoodLevel, Scale};
use vantage_core::treatment::TreatmentPlan;

use crate::error::AppError;
use crate::extract::AppJson;
use crate::routes::ComputedMeta;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/risk/classify", post(classify_risk))
        .route("/v1/risk/assess", post(assess_risk))
        .route("/v1/risk/register", post(build_risk_register))
}

/// Request for POST /v1/risk/classify
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ClassifyRequest {
    /// Likelihood key (e.g. "high") or weight ("4")
    pub likelihood: String,
    /// Impact key (e.g. "major") or weight ("4")
    pub impact: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ClassifyResponse {
    pub likelihood: LikelihoodLevel,
    pub impact: ImpactLevel,
    #[serde(flatten)]
    pub rating: RiskRating,
    pub meta: ComputedMeta,
}

/// Request for POST /v1/risk/assess: one scenario with its controls and plans.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AssessRequest {
    pub scenario: RiskScenario,
    #[serde(default)]
    pub controls: Vec<Control>,
    #[serde(default)]
    pub treatment_plans: Vec<TreatmentPlan>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AssessResponse {
    pub row: RegisterRow,
    pub meta: ComputedMeta,
}

/// Request for POST /v1/risk/register: the full register snapshot.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub scenarios: Vec<RiskScenario>,
    #[serde(default)]
    pub controls: Vec<Control>,
    #[serde(default)]
    pub treatment_plans: Vec<TreatmentPlan>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RegisterResponse {
    pub rows: Vec<RegisterRow>,
    pub summary: RegisterSummary,
    pub meta: ComputedMeta,
}

/// Classify a likelihood/impact pair
///
/// Returns the score (likelihood weight x impact weight) and its risk level.
/// Unknown keys and weights outside 1..=5 are rejected.
#[utoipa::path(
    post,
    path = "/v1/risk/classify",
    request_body = ClassifyRequest,
    responses(
        (status = 200, description = "Score and level", body = ClassifyResponse),
        (status = 400, description = "Unknown level key or out-of-range weight", body = ApiError)
    ),
    tag = "risk"
)]
pub async fn classify_risk(
    AppJson(req): AppJson<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, AppError> {
    let likelihood = LikelihoodLevel::parse(&req.likelihood)?;
    let impact = ImpactLevel::parse(&req.impact)?;

    Ok(Json(ClassifyResponse {
        likelihood,
        impact,
        rating: classify(likelihood, impact),
        meta: ComputedMeta::now(),
    }))
}

/// Assess one scenario
///
/// Runs inherent -> current -> residual for the scenario using only the
/// controls and treatment plans whose `scenario_id` matches it.
#[utoipa::path(
    post,
    path = "/v1/risk/assess",
    request_body = AssessRequest,
    responses(
        (status = 200, description = "Derived register row", body = AssessResponse),
        (status = 400, description = "Invalid snapshot", body = ApiError)
    ),
    tag = "risk"
)]
pub async fn assess_risk(
    State(state): State<AppState>,
    AppJson(req): AppJson<AssessRequest>,
) -> Result<Json<AssessResponse>, AppError> {
    state.check_snapshot_size("controls", req.controls.len() + req.treatment_plans.len())?;

    let row = assess_scenario(&req.scenario, &req.controls, &req.treatment_plans);
    tracing::debug!(
        scenario_id = %row.scenario_id,
        inherent = row.inherent.score,
        current = row.current.rating.score,
        residual = row.residual.rating.score,
        "scenario assessed"
    );

    Ok(Json(AssessResponse {
        row,
        meta: ComputedMeta::now(),
    }))
}

/// Build the risk register
///
/// Assesses every scenario in the snapshot, in input order, and summarises
/// the rows by risk level, decision, and undecided High/Critical residuals.
#[utoipa::path(
    post,
    path = "/v1/risk/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Register rows and summary", body = RegisterResponse),
        (status = 400, description = "Invalid snapshot", body = ApiError)
    ),
    tag = "risk"
)]
pub async fn build_risk_register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    state.check_snapshot_size(
        "snapshot",
        req.scenarios.len() + req.controls.len() + req.treatment_plans.len(),
    )?;

    let register = build_register(&req.scenarios, &req.controls, &req.treatment_plans);
    tracing::debug!(
        scenarios = register.summary.total,
        controls = req.controls.len(),
        needs_attention = register.summary.needs_attention,
        "risk register computed"
    );

    Ok(Json(RegisterResponse {
        rows: register.rows,
        summary: register.summary,
        meta: ComputedMeta::now(),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::routes::test_support::post_json;

    fn app() -> Router {
        router().with_state(AppState::for_tests())
    }

    fn scenario(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "asset_id": "server-room",
            "threat_type": "forced_entry",
            "likelihood": "high",
            "impact": "major"
        })
    }

    #[tokio::test]
    async fn classify_accepts_keys_and_weights() {
        let (status, body) =
            post_json(app(), "/v1/risk/classify", json!({"likelihood": "high", "impact": "4"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score"], 16);
        assert_eq!(body["level"], "high");
        assert_eq!(body["impact"], "major");
        assert!(body["meta"]["computed_at"].is_string());
    }

    #[tokio::test]
    async fn classify_rejects_unknown_key() {
        let (status, body) =
            post_json(app(), "/v1/risk/classify", json!({"likelihood": "often", "impact": "major"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "invalid_level_key");
        assert_eq!(body["field"], "likelihood");
        assert_eq!(body["received"], "often");
    }

    #[tokio::test]
    async fn classify_rejects_out_of_range_weight() {
        let (status, body) =
            post_json(app(), "/v1/risk/classify", json!({"likelihood": "3", "impact": "0"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "out_of_range_rating");
    }

    #[tokio::test]
    async fn assess_runs_the_full_pipeline() {
        let (status, body) = post_json(
            app(),
            "/v1/risk/assess",
            json!({
                "scenario": scenario("s1"),
                "controls": [
                    {"id": "c1", "scenario_id": "s1", "control_type": "existing", "effectiveness": 4},
                    {"id": "c2", "scenario_id": "s1", "control_type": "proposed",
                     "primary_effect": "reduce_likelihood", "treatment_effectiveness": 3}
                ]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let row = &body["row"];
        assert_eq!(row["inherent"]["score"], 16);
        assert_eq!(row["inherent"]["level"], "high");
        assert_eq!(row["current"]["likelihood_reduction_percent"], 40.0);
        assert_eq!(row["current"]["current_likelihood"], "medium");
        assert_eq!(row["current"]["rating"]["level"], "medium");
        assert_eq!(row["residual"]["residual_likelihood"], "low");
        assert_eq!(row["residual"]["rating"]["score"], 8);
        assert_eq!(row["residual"]["rating"]["level"], "low");
        assert_eq!(row["decision"], "undecided");
    }

    #[tokio::test]
    async fn assess_rejects_out_of_range_effectiveness() {
        let (status, body) = post_json(
            app(),
            "/v1/risk/assess",
            json!({
                "scenario": scenario("s1"),
                "controls": [
                    {"id": "c1", "scenario_id": "s1", "control_type": "existing", "effectiveness": 7}
                ]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_failed");
        assert_eq!(body["error_code"], "out_of_range_rating");
    }

    #[tokio::test]
    async fn register_rejects_unknown_likelihood_key() {
        let mut bad = scenario("s1");
        bad["likelihood"] = json!("sometimes");
        let (status, body) = post_json(app(), "/v1/risk/register", json!({"scenarios": [bad]})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "invalid_level_key");
    }

    #[tokio::test]
    async fn register_summarises_rows() {
        let mut accepted = scenario("s2");
        accepted["decision"] = json!("accept");
        let (status, body) = post_json(
            app(),
            "/v1/risk/register",
            json!({
                "scenarios": [scenario("s1"), accepted],
                "treatment_plans": [
                    {"id": "t1", "scenario_id": "s1", "effect": "reduce_impact", "value": 2}
                ]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rows"][0]["residual"]["rating"]["score"], 8);
        assert_eq!(body["rows"][1]["residual"]["rating"]["score"], 16);
        assert_eq!(body["summary"]["total"], 2);
        assert_eq!(body["summary"]["needs_attention"], 0);
    }

    #[tokio::test]
    async fn register_enforces_snapshot_limit() {
        let scenarios: Vec<serde_json::Value> = (0..11).map(|i| scenario(&format!("s{i}"))).collect();
        let (status, body) =
            post_json(app(), "/v1/risk/register", json!({"scenarios": scenarios})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "snapshot_too_large");
    }
}
