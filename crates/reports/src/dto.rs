//! Wire types of the report endpoints. Field names follow the public
//! contract (Portuguese), matching what the gateway and existing clients
//! expect.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::aggregate::{Granularidade, OrdenarPor};

// ---- query parameters ----
//
// All parameters arrive as raw strings and are validated by the report
// service, so an out-of-range value yields a 422 with a descriptive message
// instead of the extractor's opaque 400.

#[derive(Debug, Default, Clone, Deserialize)]
pub struct SumarioParams {
    pub data_inicio: Option<String>,
    pub data_fim: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct PeriodoParams {
    pub data_inicio: Option<String>,
    pub data_fim: Option<String>,
    pub granularidade: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RankingParams {
    pub data_inicio: Option<String>,
    pub data_fim: Option<String>,
    pub ordenar_por: Option<String>,
    pub top: Option<String>,
    pub incluir_titulos: Option<String>,
    pub incluir_nomes: Option<String>,
}

// ---- responses ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendasSumario {
    pub periodo_inicio: Option<NaiveDate>,
    pub periodo_fim: Option<NaiveDate>,
    pub total_vendas: u64,
    pub valor_total_vendido: f64,
    pub total_produtos_vendidos: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodoBucket {
    pub periodo: String,
    pub quantidade_vendas: u64,
    pub valor_total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendasPorPeriodo {
    pub granularidade: Granularidade,
    pub series: Vec<PeriodoBucket>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingProdutoItem {
    pub produto_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub titulo: Option<String>,
    pub qtd_total: i64,
    pub valor_total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingProdutos {
    pub ordenar_por: OrdenarPor,
    pub top: u32,
    pub itens: Vec<RankingProdutoItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingFuncionarioItem {
    pub funcionario_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    pub qtd_vendas: i64,
    pub valor_total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingFuncionarios {
    pub ordenar_por: OrdenarPor,
    pub top: u32,
    pub itens: Vec<RankingFuncionarioItem>,
}
