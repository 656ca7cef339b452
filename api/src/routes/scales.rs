use axum::{Json, Router, routing::get};
use serde::Serialize;
use vantage_core::classify::{RiskBand, risk_bands};
use vantage_core::scales::{ImpactLevel, LikelihoodLevel, ScaleEntry, effectiveness_table, scale_table};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/scales", get(get_scales))
}

/// Response for GET /v1/scales
#[derive(Serialize, utoipa::ToSchema)]
pub struct ScalesResponse {
    pub likelihood: Vec<ScaleEntry>,
    pub impact: Vec<ScaleEntry>,
    pub effectiveness: Vec<ScaleEntry>,
    pub risk_levels: Vec<RiskBand>,
}

/// Get the rating scales and risk-level bands
///
/// Static reference data: level keys accepted by the scoring endpoints,
/// their weights, and the score range of each risk level. Clients may
/// cache this per session.
#[utoipa::path(
    get,
    path = "/v1/scales",
    responses(
        (status = 200, description = "Rating scales", body = ScalesResponse)
    ),
    tag = "reference"
)]
pub async fn get_scales() -> Json<ScalesResponse> {
    Json(ScalesResponse {
        likelihood: scale_table::<LikelihoodLevel>(),
        impact: scale_table::<ImpactLevel>(),
        effectiveness: effectiveness_table(),
        risk_levels: risk_bands(),
    })
}
