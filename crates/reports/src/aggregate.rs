//! Pure aggregation over sale records.
//!
//! Records arrive as raw JSON from the sales service and individual fields
//! are resolved through ordered candidate-key probing (`common::json`), so a
//! record that lacks a field contributes a default instead of failing the
//! whole report. Monetary sums keep full precision here; rounding happens at
//! the response boundary.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use common::json::{first_array, first_f64, first_i64, first_str};

use crate::dto::PeriodoBucket;

const DATE_KEYS: &[&str] = &["data_venda", "data", "date", "created_at"];
const RECORD_VALUE_KEYS: &[&str] = &["valor_total", "total", "valor"];
const ITEM_LIST_KEYS: &[&str] = &["itens", "items", "produtos"];
const PRODUCT_ID_KEYS: &[&str] = &["produto_id", "id_produto", "product_id"];
const QUANTITY_KEYS: &[&str] = &["quantidade", "qtd", "quantity"];
const UNIT_PRICE_KEYS: &[&str] = &["preco_unitario", "preco", "unit_price"];
const ITEM_TOTAL_KEYS: &[&str] = &["valor_total", "total", "subtotal"];
const EMPLOYEE_ID_KEYS: &[&str] = &["funcionario_id", "id_funcionario", "employee_id"];

/// Bucket width of the time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularidade {
    Dia,
    Mes,
}

impl Granularidade {
    /// Prefix length of the ISO date string that forms the bucket key:
    /// "YYYY-MM-DD" for days, "YYYY-MM" for months.
    fn key_len(self) -> usize {
        match self {
            Granularidade::Dia => 10,
            Granularidade::Mes => 7,
        }
    }
}

impl FromStr for Granularidade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dia" => Ok(Granularidade::Dia),
            "mes" => Ok(Granularidade::Mes),
            other => Err(format!("granularidade must be 'dia' or 'mes', got '{}'", other)),
        }
    }
}

/// Metric a ranking is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrdenarPor {
    Qtd,
    Valor,
}

impl FromStr for OrdenarPor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "qtd" => Ok(OrdenarPor::Qtd),
            "valor" => Ok(OrdenarPor::Valor),
            other => Err(format!("ordenar_por must be 'qtd' or 'valor', got '{}'", other)),
        }
    }
}

/// Per-key running totals of a ranking, before enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct Acumulado {
    pub id: i64,
    pub qtd: i64,
    pub valor: f64,
}

/// Time-bucketed sales series, ascending by period key.
///
/// Records without a usable date string (missing, or shorter than a full
/// "YYYY-MM-DD") are skipped; a record whose value field is missing or
/// non-numeric still counts, contributing 0 to the bucket value.
pub fn serie_por_periodo(registros: &[Value], granularidade: Granularidade) -> Vec<PeriodoBucket> {
    let mut buckets: std::collections::BTreeMap<String, (u64, f64)> = Default::default();
    for registro in registros {
        let Some(data) = first_str(registro, DATE_KEYS) else { continue };
        if data.len() < 10 {
            continue;
        }
        let Some(chave) = data.get(..granularidade.key_len()) else { continue };
        let valor = first_f64(registro, RECORD_VALUE_KEYS).unwrap_or(0.0);
        let entry = buckets.entry(chave.to_string()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += valor;
    }
    buckets
        .into_iter()
        .map(|(periodo, (quantidade_vendas, valor_total))| PeriodoBucket {
            periodo,
            quantidade_vendas,
            valor_total: round2(valor_total),
        })
        .collect()
}

/// Top-N products by quantity or value, accumulated per line item.
///
/// A line item with no resolvable integer product id is skipped. Quantity
/// defaults to 1; item value prefers an explicit total and otherwise falls
/// back to quantity × unit price (unit price defaulting to 0).
pub fn ranking_produtos(registros: &[Value], ordenar_por: OrdenarPor, top: usize) -> Vec<Acumulado> {
    let mut acumulados: Vec<Acumulado> = Vec::new();
    let mut indice: HashMap<i64, usize> = HashMap::new();

    for registro in registros {
        let Some(itens) = first_array(registro, ITEM_LIST_KEYS) else { continue };
        for item in itens {
            let Some(produto_id) = first_i64(item, PRODUCT_ID_KEYS) else { continue };
            let qtd = first_i64(item, QUANTITY_KEYS).unwrap_or(1);
            let valor = match first_f64(item, ITEM_TOTAL_KEYS) {
                Some(total) => total,
                None => qtd as f64 * first_f64(item, UNIT_PRICE_KEYS).unwrap_or(0.0),
            };
            acumular(&mut acumulados, &mut indice, produto_id, qtd, valor);
        }
    }
    ordenar_e_truncar(acumulados, ordenar_por, top)
}

/// Top-N employees: one accumulation step per record (not per line item),
/// counting 1 sale and the record-level total value.
pub fn ranking_funcionarios(
    registros: &[Value],
    ordenar_por: OrdenarPor,
    top: usize,
) -> Vec<Acumulado> {
    let mut acumulados: Vec<Acumulado> = Vec::new();
    let mut indice: HashMap<i64, usize> = HashMap::new();

    for registro in registros {
        let Some(funcionario_id) = first_i64(registro, EMPLOYEE_ID_KEYS) else { continue };
        let valor = first_f64(registro, RECORD_VALUE_KEYS).unwrap_or(0.0);
        acumular(&mut acumulados, &mut indice, funcionario_id, 1, valor);
    }
    ordenar_e_truncar(acumulados, ordenar_por, top)
}

/// Summary totals computed from the fetched records, used when the sales
/// page carries no statistics block: record count, record-level value sum
/// and summed line-item quantities.
pub fn sumario_de_registros(registros: &[Value]) -> (u64, f64, i64) {
    let total_vendas = registros.len() as u64;
    let mut valor_total = 0.0;
    let mut total_produtos = 0i64;
    for registro in registros {
        valor_total += first_f64(registro, RECORD_VALUE_KEYS).unwrap_or(0.0);
        if let Some(itens) = first_array(registro, ITEM_LIST_KEYS) {
            for item in itens {
                total_produtos += first_i64(item, QUANTITY_KEYS).unwrap_or(1);
            }
        }
    }
    (total_vendas, valor_total, total_produtos)
}

/// Round to 2 decimal places. Applied only at the response boundary.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn acumular(
    acumulados: &mut Vec<Acumulado>,
    indice: &mut HashMap<i64, usize>,
    id: i64,
    qtd: i64,
    valor: f64,
) {
    match indice.get(&id) {
        Some(&pos) => {
            acumulados[pos].qtd += qtd;
            acumulados[pos].valor += valor;
        }
        None => {
            indice.insert(id, acumulados.len());
            acumulados.push(Acumulado { id, qtd, valor });
        }
    }
}

// Stable sort: ties keep discovery order.
fn ordenar_e_truncar(
    mut acumulados: Vec<Acumulado>,
    ordenar_por: OrdenarPor,
    top: usize,
) -> Vec<Acumulado> {
    match ordenar_por {
        OrdenarPor::Qtd => acumulados.sort_by(|a, b| b.qtd.cmp(&a.qtd)),
        OrdenarPor::Valor => acumulados.sort_by(|a, b| {
            b.valor
                .partial_cmp(&a.valor)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
    }
    acumulados.truncate(top);
    acumulados
}
