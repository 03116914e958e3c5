//! Report orchestration: validate parameters, fetch one bounded page from
//! the sales service, aggregate, then enrich the surviving ranking rows.

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{info, warn};

use clients::{FetchError, PaginaVendas, VendasClient};
use common::json::{first_f64, first_i64};

use crate::aggregate::{self, round2, Granularidade, OrdenarPor};
use crate::dto::{
    PeriodoParams, RankingFuncionarioItem, RankingFuncionarios, RankingParams,
    RankingProdutoItem, RankingProdutos, SumarioParams, VendasPorPeriodo, VendasSumario,
};
use crate::enrich::NameCache;
use crate::error::ReportError;

/// Reports read a single bounded page from the sales service; there is no
/// cross-page pagination.
pub const PAGE_LIMIT: u32 = 1000;

const TOP_PADRAO: u32 = 10;

pub struct ReportService {
    vendas: VendasClient,
    titulos: NameCache,
    nomes: NameCache,
}

impl ReportService {
    pub fn new(vendas: VendasClient, titulos: NameCache, nomes: NameCache) -> Self {
        Self { vendas, titulos, nomes }
    }

    pub async fn vendas_sumario(&self, params: &SumarioParams) -> Result<VendasSumario, ReportError> {
        let data_inicio = parse_data(params.data_inicio.as_deref(), "data_inicio")?;
        let data_fim = parse_data(params.data_fim.as_deref(), "data_fim")?;

        let pagina = self.fetch_pagina(data_inicio, data_fim).await?;
        let (total_vendas, valor_total, total_produtos) = match pagina.estatisticas() {
            // The statistics block covers the whole filtered period, not
            // just the fetched page; prefer it when present.
            Some(stats) => sumario_de_estatisticas(stats),
            None => aggregate::sumario_de_registros(pagina.registros()),
        };

        info!(total_vendas, "sales summary assembled");
        Ok(VendasSumario {
            periodo_inicio: data_inicio,
            periodo_fim: data_fim,
            total_vendas,
            valor_total_vendido: round2(valor_total),
            total_produtos_vendidos: total_produtos,
        })
    }

    pub async fn vendas_por_periodo(
        &self,
        params: &PeriodoParams,
    ) -> Result<VendasPorPeriodo, ReportError> {
        let data_inicio = parse_data(params.data_inicio.as_deref(), "data_inicio")?;
        let data_fim = parse_data(params.data_fim.as_deref(), "data_fim")?;
        let granularidade = parse_granularidade(params.granularidade.as_deref())?;

        let pagina = self.fetch_pagina(data_inicio, data_fim).await?;
        let series = aggregate::serie_por_periodo(pagina.registros(), granularidade);

        info!(buckets = series.len(), "period series assembled");
        Ok(VendasPorPeriodo { granularidade, series })
    }

    pub async fn ranking_produtos(
        &self,
        params: &RankingParams,
    ) -> Result<RankingProdutos, ReportError> {
        let data_inicio = parse_data(params.data_inicio.as_deref(), "data_inicio")?;
        let data_fim = parse_data(params.data_fim.as_deref(), "data_fim")?;
        let ordenar_por = parse_ordenar_por(params.ordenar_por.as_deref())?;
        let top = parse_top(params.top.as_deref())?;
        let incluir_titulos = parse_flag(params.incluir_titulos.as_deref(), "incluir_titulos")?;

        let pagina = self.fetch_pagina(data_inicio, data_fim).await?;
        let ranking = aggregate::ranking_produtos(pagina.registros(), ordenar_por, top as usize);
        let itens = montar_itens_produtos(&self.titulos, ranking, incluir_titulos).await;

        info!(itens = itens.len(), "product ranking assembled");
        Ok(RankingProdutos { ordenar_por, top, itens })
    }

    pub async fn ranking_funcionarios(
        &self,
        params: &RankingParams,
    ) -> Result<RankingFuncionarios, ReportError> {
        let data_inicio = parse_data(params.data_inicio.as_deref(), "data_inicio")?;
        let data_fim = parse_data(params.data_fim.as_deref(), "data_fim")?;
        let ordenar_por = parse_ordenar_por(params.ordenar_por.as_deref())?;
        let top = parse_top(params.top.as_deref())?;
        let incluir_nomes = parse_flag(params.incluir_nomes.as_deref(), "incluir_nomes")?;

        let pagina = self.fetch_pagina(data_inicio, data_fim).await?;
        let ranking = aggregate::ranking_funcionarios(pagina.registros(), ordenar_por, top as usize);
        let itens = montar_itens_funcionarios(&self.nomes, ranking, incluir_nomes).await;

        info!(itens = itens.len(), "employee ranking assembled");
        Ok(RankingFuncionarios { ordenar_por, top, itens })
    }

    /// One page of sales. A malformed payload degrades to an empty page so
    /// aggregation yields empty output instead of an error.
    async fn fetch_pagina(
        &self,
        data_inicio: Option<NaiveDate>,
        data_fim: Option<NaiveDate>,
    ) -> Result<PaginaVendas, ReportError> {
        match self.vendas.fetch_pagina(data_inicio, data_fim, 0, PAGE_LIMIT).await {
            Ok(pagina) => Ok(pagina),
            Err(FetchError::Malformed { detail, .. }) => {
                warn!(%detail, "undecodable sales payload; degrading to empty page");
                Ok(PaginaVendas::new(Value::Null))
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn sumario_de_estatisticas(stats: &Value) -> (u64, f64, i64) {
    let total_vendas = first_i64(stats, &["total_registros"]).unwrap_or(0).max(0) as u64;
    let valor_total = first_f64(stats, &["valor_total_periodo"]).unwrap_or(0.0);
    let total_produtos = first_i64(stats, &["total_produtos_periodo"]).unwrap_or(0);
    (total_vendas, valor_total, total_produtos)
}

/// Enrichment runs only over the surviving top-N rows, bounding remote
/// lookups to O(top) rather than O(distinct keys).
async fn montar_itens_produtos(
    titulos: &NameCache,
    ranking: Vec<aggregate::Acumulado>,
    incluir_titulos: bool,
) -> Vec<RankingProdutoItem> {
    let mut itens = Vec::with_capacity(ranking.len());
    for acc in ranking {
        let titulo = if incluir_titulos { titulos.resolve(acc.id).await } else { None };
        itens.push(RankingProdutoItem {
            produto_id: acc.id,
            titulo,
            qtd_total: acc.qtd,
            valor_total: round2(acc.valor),
        });
    }
    itens
}

async fn montar_itens_funcionarios(
    nomes: &NameCache,
    ranking: Vec<aggregate::Acumulado>,
    incluir_nomes: bool,
) -> Vec<RankingFuncionarioItem> {
    let mut itens = Vec::with_capacity(ranking.len());
    for acc in ranking {
        let nome = if incluir_nomes { nomes.resolve(acc.id).await } else { None };
        itens.push(RankingFuncionarioItem {
            funcionario_id: acc.id,
            nome,
            qtd_vendas: acc.qtd,
            valor_total: round2(acc.valor),
        });
    }
    itens
}

// ---- parameter validation ----

fn parse_data(raw: Option<&str>, campo: &str) -> Result<Option<NaiveDate>, ReportError> {
    match raw {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map(Some).map_err(|_| {
            ReportError::Validation(format!(
                "{} must be an ISO calendar date (YYYY-MM-DD), got '{}'",
                campo, s
            ))
        }),
    }
}

fn parse_granularidade(raw: Option<&str>) -> Result<Granularidade, ReportError> {
    match raw {
        None => Ok(Granularidade::Dia),
        Some(s) => s.parse().map_err(ReportError::Validation),
    }
}

fn parse_ordenar_por(raw: Option<&str>) -> Result<OrdenarPor, ReportError> {
    match raw {
        None => Ok(OrdenarPor::Valor),
        Some(s) => s.parse().map_err(ReportError::Validation),
    }
}

fn parse_top(raw: Option<&str>) -> Result<u32, ReportError> {
    let Some(s) = raw else { return Ok(TOP_PADRAO) };
    let top = s.parse::<u32>().map_err(|_| {
        ReportError::Validation(format!("top must be an integer between 1 and 1000, got '{}'", s))
    })?;
    if !(1..=1000).contains(&top) {
        return Err(ReportError::Validation(format!(
            "top must be between 1 and 1000, got {}",
            top
        )));
    }
    Ok(top)
}

fn parse_flag(raw: Option<&str>, campo: &str) -> Result<bool, ReportError> {
    match raw.map(str::to_ascii_lowercase).as_deref() {
        None | Some("") => Ok(false),
        Some("true") | Some("1") | Some("yes") => Ok(true),
        Some("false") | Some("0") | Some("no") => Ok(false),
        Some(other) => Err(ReportError::Validation(format!(
            "{} must be a boolean, got '{}'",
            campo, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Acumulado;
    use crate::enrich::tests::StubSource;
    use crate::enrich::{NameCache, DEFAULT_CAPACITY};
    use serde_json::json;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    #[test]
    fn parse_data_aceita_iso_e_rejeita_o_resto() {
        assert_eq!(parse_data(None, "data_inicio").unwrap(), None);
        assert_eq!(
            parse_data(Some("2025-10-01"), "data_inicio").unwrap(),
            Some(NaiveDate::from_ymd_opt(2025, 10, 1).unwrap())
        );
        assert!(matches!(
            parse_data(Some("01/10/2025"), "data_inicio"),
            Err(ReportError::Validation(_))
        ));
        assert!(matches!(
            parse_data(Some("2025-13-01"), "data_fim"),
            Err(ReportError::Validation(_))
        ));
    }

    #[test]
    fn parse_top_limita_intervalo() {
        assert_eq!(parse_top(None).unwrap(), 10);
        assert_eq!(parse_top(Some("1")).unwrap(), 1);
        assert_eq!(parse_top(Some("1000")).unwrap(), 1000);
        assert!(parse_top(Some("0")).is_err());
        assert!(parse_top(Some("1001")).is_err());
        assert!(parse_top(Some("dez")).is_err());
    }

    #[test]
    fn parse_flag_aceita_formas_usuais() {
        assert!(!parse_flag(None, "incluir_titulos").unwrap());
        assert!(parse_flag(Some("true"), "incluir_titulos").unwrap());
        assert!(parse_flag(Some("1"), "incluir_titulos").unwrap());
        assert!(!parse_flag(Some("false"), "incluir_titulos").unwrap());
        assert!(parse_flag(Some("talvez"), "incluir_titulos").is_err());
    }

    #[test]
    fn parse_enums_usam_padroes_do_contrato() {
        assert_eq!(parse_granularidade(None).unwrap(), Granularidade::Dia);
        assert_eq!(parse_ordenar_por(None).unwrap(), OrdenarPor::Valor);
        assert!(parse_granularidade(Some("semana")).is_err());
        assert!(parse_ordenar_por(Some("nome")).is_err());
    }

    #[test]
    fn sumario_de_estatisticas_le_o_bloco_do_upstream() {
        let stats = json!({
            "total_registros": 15,
            "valor_total_periodo": 1234.5,
            "total_produtos_periodo": 42
        });
        assert_eq!(sumario_de_estatisticas(&stats), (15, 1234.5, 42));
        assert_eq!(sumario_de_estatisticas(&json!({})), (0, 0.0, 0));
    }

    #[tokio::test]
    async fn enriquecimento_so_para_linhas_sobreviventes() {
        let source = Arc::new(StubSource::with_names(&[(1, "Ana"), (2, "Bia"), (3, "Caio")]));
        let cache = NameCache::new(source.clone(), DEFAULT_CAPACITY);

        // three distinct keys accumulated, but only two survive the cut
        let sobreviventes = vec![
            Acumulado { id: 1, qtd: 2, valor: 130.0 },
            Acumulado { id: 2, qtd: 1, valor: 50.0 },
        ];
        let itens = montar_itens_funcionarios(&cache, sobreviventes, true).await;

        assert_eq!(itens.len(), 2);
        assert_eq!(itens[0].nome.as_deref(), Some("Ana"));
        assert_eq!(itens[1].nome.as_deref(), Some("Bia"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn enriquecimento_desligado_nao_chama_o_upstream() {
        let source = Arc::new(StubSource::with_names(&[(1, "Ana")]));
        let cache = NameCache::new(source.clone(), DEFAULT_CAPACITY);

        let itens = montar_itens_produtos(
            &cache,
            vec![Acumulado { id: 1, qtd: 1, valor: 9.99 }],
            false,
        )
        .await;

        assert_eq!(itens[0].titulo, None);
        assert_eq!(itens[0].valor_total, 9.99);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn falha_de_enriquecimento_vira_nome_ausente() {
        let source = Arc::new(StubSource::with_names(&[]));
        let cache = NameCache::new(source, DEFAULT_CAPACITY);

        let itens = montar_itens_produtos(
            &cache,
            vec![Acumulado { id: 77, qtd: 3, valor: 10.0 }],
            true,
        )
        .await;

        assert_eq!(itens.len(), 1);
        assert_eq!(itens[0].titulo, None);
        assert_eq!(itens[0].qtd_total, 3);
    }
}
