use std::net::SocketAddr;

use axum::Router;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod extract;
mod middleware;
mod routes;
mod state;

use config::ApiConfig;
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vantage API",
        version = "0.1.0",
        description = "Risk scoring and survey completion for physical-security assessments. \
                       Stateless: every request carries the full snapshot it is scored against."
    ),
    paths(
        routes::health::health_check,
        routes::scales::get_scales,
        routes::risk::classify_risk,
        routes::risk::assess_risk,
        routes::risk::build_risk_register,
        routes::surveys::survey_progress,
        routes::surveys::survey_findings,
    ),
    components(schemas(
        HealthResponse,
        routes::ComputedMeta,
        routes::scales::ScalesResponse,
        routes::risk::ClassifyRequest,
        routes::risk::ClassifyResponse,
        routes::risk::AssessRequest,
        routes::risk::AssessResponse,
        routes::risk::RegisterRequest,
        routes::risk::RegisterResponse,
        routes::surveys::SurveySnapshotRequest,
        routes::surveys::ProgressResponse,
        routes::surveys::FindingsResponse,
        vantage_core::error::ApiError,
        vantage_core::scales::LikelihoodLevel,
        vantage_core::scales::ImpactLevel,
        vantage_core::scales::Rating,
        vantage_core::scales::ScaleEntry,
        vantage_core::classify::RiskLevel,
        vantage_core::classify::RiskRating,
        vantage_core::classify::RiskBand,
        vantage_core::controls::Control,
        vantage_core::controls::ControlType,
        vantage_core::controls::PrimaryEffect,
        vantage_core::controls::CurrentRisk,
        vantage_core::treatment::TreatmentPlan,
        vantage_core::treatment::MitigationEffect,
        vantage_core::treatment::ResidualRisk,
        vantage_core::register::RiskScenario,
        vantage_core::register::TreatmentDecision,
        vantage_core::register::RegisterRow,
        vantage_core::register::RegisterSummary,
        vantage_core::register::LevelCount,
        vantage_core::register::DecisionCount,
        vantage_core::survey::SurveyQuestion,
        vantage_core::survey::QuestionType,
        vantage_core::survey::RiskDirection,
        vantage_core::completion::Progress,
        vantage_core::completion::CategoryProgress,
        vantage_core::findings::Finding,
        vantage_core::findings::CategoryFindings,
    ))
)]
struct ApiDoc;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

fn build_app(state: AppState) -> Router {
    let cors_layer = middleware::cors::build_cors_layer(&state.config);
    let require_https = state.config.require_https;

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(routes::health::router())
        .merge(routes::scales::router().layer(middleware::rate_limit::reference_layer()))
        .merge(routes::risk::router().layer(middleware::rate_limit::scoring_layer()))
        .merge(routes::surveys::router().layer(middleware::rate_limit::scoring_layer()))
        .layer(axum::middleware::from_fn(middleware::security_headers::apply))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .option_layer(require_https.then(|| {
                    axum::middleware::from_fn(middleware::https::require_https)
                }))
                .layer(cors_layer),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load .env if present (dev only)
    let _ = dotenvy::dotenv();

    // Structured JSON logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vantage_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = ApiConfig::from_env();
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(
        require_https = config.require_https,
        max_snapshot_items = config.max_snapshot_items,
        cors_origins = ?config.cors_origins,
        "configuration loaded"
    );

    let app = build_app(AppState::new(config));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(%addr, error = %err, "failed to bind listener");
            std::process::exit(1);
        }
    };
    tracing::info!("Vantage API listening on {}", addr);

    if let Err(err) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        tracing::error!(error = %err, "server terminated");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_scoring_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/v1/scales",
            "/v1/risk/classify",
            "/v1/risk/assess",
            "/v1/risk/register",
            "/v1/surveys/progress",
            "/v1/surveys/findings",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
