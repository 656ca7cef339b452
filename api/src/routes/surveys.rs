use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use vantage_core::completion::{CategoryProgress, Progress, completion_report};
use vantage_core::error::ApiError;
use vantage_core::findings::{CategoryFindings, Finding, findings};
use vantage_core::survey::SurveyQuestion;

use crate::error::AppError;
use crate::extract::AppJson;
use crate::routes::ComputedMeta;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/surveys/progress", post(survey_progress))
        .route("/v1/surveys/findings", post(survey_findings))
}

/// The current questionnaire snapshot.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SurveySnapshotRequest {
    pub questions: Vec<SurveyQuestion>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProgressResponse {
    /// Every question; conditionals waiting on an unanswered prerequisite count as done
    pub all: Progress,
    /// Visible questions only
    pub visible: Progress,
    pub categories: Vec<CategoryProgress>,
    pub meta: ComputedMeta,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct FindingsResponse {
    pub findings: Vec<Finding>,
    pub by_category: Vec<CategoryFindings>,
    pub meta: ComputedMeta,
}

/// Compute questionnaire completion
///
/// Returns completion over all questions and over the visible slice, overall
/// and per category (in order of first appearance).
#[utoipa::path(
    post,
    path = "/v1/surveys/progress",
    request_body = SurveySnapshotRequest,
    responses(
        (status = 200, description = "Completion report", body = ProgressResponse),
        (status = 400, description = "Invalid snapshot", body = ApiError)
    ),
    tag = "surveys"
)]
pub async fn survey_progress(
    State(state): State<AppState>,
    AppJson(req): AppJson<SurveySnapshotRequest>,
) -> Result<Json<ProgressResponse>, AppError> {
    state.check_snapshot_size("questions", req.questions.len())?;

    let report = completion_report(&req.questions);
    tracing::debug!(
        questions = report.all.total,
        completed = report.all.completed,
        visible = report.visible.total,
        "survey progress computed"
    );

    Ok(Json(ProgressResponse {
        all: report.all,
        visible: report.visible,
        categories: report.categories,
        meta: ComputedMeta::now(),
    }))
}

/// List survey findings
///
/// Visible answers that point at a missing or failing safeguard, honoring
/// each question's risk direction, with gap counts per category.
#[utoipa::path(
    post,
    path = "/v1/surveys/findings",
    request_body = SurveySnapshotRequest,
    responses(
        (status = 200, description = "Findings report", body = FindingsResponse),
        (status = 400, description = "Invalid snapshot", body = ApiError)
    ),
    tag = "surveys"
)]
pub async fn survey_findings(
    State(state): State<AppState>,
    AppJson(req): AppJson<SurveySnapshotRequest>,
) -> Result<Json<FindingsResponse>, AppError> {
    state.check_snapshot_size("questions", req.questions.len())?;

    let report = findings(&req.questions);
    tracing::debug!(
        questions = req.questions.len(),
        findings = report.findings.len(),
        "survey findings computed"
    );

    Ok(Json(FindingsResponse {
        findings: report.findings,
        by_category: report.by_category,
        meta: ComputedMeta::now(),
    }))
}
