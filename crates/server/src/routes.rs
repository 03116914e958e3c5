use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use reports::dto::{
    PeriodoParams, RankingFuncionarios, RankingParams, RankingProdutos, SumarioParams,
    VendasPorPeriodo, VendasSumario,
};
use reports::ReportService;

use crate::errors::ApiError;
use crate::observability::{encode_metrics, REPORT_REQUESTS_TOTAL};

#[derive(Clone)]
pub struct AppState {
    pub reports: Arc<ReportService>,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> (axum::http::StatusCode, String) {
    encode_metrics()
}

async fn vendas_sumario(
    State(state): State<AppState>,
    Query(params): Query<SumarioParams>,
) -> Result<Json<VendasSumario>, ApiError> {
    REPORT_REQUESTS_TOTAL.inc();
    Ok(Json(state.reports.vendas_sumario(&params).await?))
}

async fn vendas_por_periodo(
    State(state): State<AppState>,
    Query(params): Query<PeriodoParams>,
) -> Result<Json<VendasPorPeriodo>, ApiError> {
    REPORT_REQUESTS_TOTAL.inc();
    Ok(Json(state.reports.vendas_por_periodo(&params).await?))
}

async fn ranking_produtos(
    State(state): State<AppState>,
    Query(params): Query<RankingParams>,
) -> Result<Json<RankingProdutos>, ApiError> {
    REPORT_REQUESTS_TOTAL.inc();
    Ok(Json(state.reports.ranking_produtos(&params).await?))
}

async fn ranking_funcionarios(
    State(state): State<AppState>,
    Query(params): Query<RankingParams>,
) -> Result<Json<RankingFuncionarios>, ApiError> {
    REPORT_REQUESTS_TOTAL.inc();
    Ok(Json(state.reports.ranking_funcionarios(&params).await?))
}

/// Build the full application router: health, metrics and report routes.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/relatorios/vendas-sumario", get(vendas_sumario))
        .route("/relatorios/vendas-por-periodo", get(vendas_por_periodo))
        .route("/relatorios/ranking-produtos", get(ranking_produtos))
        .route("/relatorios/ranking-funcionarios", get(ranking_funcionarios))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
