use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use clients::{FuncionariosClient, ProdutosClient, VendasClient};
use configs::{AppConfig, UpstreamsConfig};
use reports::enrich::{NameCache, DEFAULT_CAPACITY};
use reports::ReportService;

use crate::routes::{self, AppState};

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire the upstream clients, enrichment caches and report service.
pub fn build_state(upstreams: &UpstreamsConfig) -> AppState {
    let fetch_timeout = Duration::from_secs(upstreams.fetch_timeout_secs);
    let enrich_timeout = Duration::from_secs(upstreams.enrich_timeout_secs);

    let vendas = VendasClient::new(upstreams.vendas_url.clone(), fetch_timeout);
    let produtos = ProdutosClient::new(upstreams.produtos_url.clone(), enrich_timeout);
    let funcionarios = FuncionariosClient::new(upstreams.funcionarios_url.clone(), enrich_timeout);

    let titulos = NameCache::new(Arc::new(produtos), DEFAULT_CAPACITY);
    let nomes = NameCache::new(Arc::new(funcionarios), DEFAULT_CAPACITY);

    AppState {
        reports: Arc::new(ReportService::new(vendas, titulos, nomes)),
    }
}

/// Load host/port from configs or env vars, with sensible fallbacks
fn load_bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    let host = if cfg.server.host.trim().is_empty() {
        env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string())
    } else {
        cfg.server.host.clone()
    };
    let port = env::var("SERVER_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(cfg.server.port);
    Ok(format!("{}:{}", host, port).parse()?)
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = AppConfig::load_and_validate()?;
    let state = build_state(&cfg.upstreams);

    let cors = build_cors();
    let app: Router = routes::build_router(state, cors);

    let addr = load_bind_addr(&cfg)?;
    info!(%addr, vendas = %cfg.upstreams.vendas_url, "starting reports service");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
