use std::time::Duration;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, warn};

use common::json::first_array;

use crate::error::FetchError;

const SERVICE: &str = "vendas";

/// The record list has been observed under different container keys across
/// deployments of the sales service; probe them in order.
const CONTAINER_KEYS: &[&str] = &["vendas", "items", "results"];

/// One page of the sales listing, kept as raw JSON because the upstream
/// schema is not guaranteed.
#[derive(Debug, Clone)]
pub struct PaginaVendas {
    raw: Value,
}

impl PaginaVendas {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    /// Sale records of this page. Missing or unrecognized container key
    /// degrades to an empty list.
    pub fn registros(&self) -> &[Value] {
        match first_array(&self.raw, CONTAINER_KEYS) {
            Some(arr) => arr.as_slice(),
            None => {
                warn!(service = SERVICE, "page payload has no known record list key");
                &[]
            }
        }
    }

    /// Period statistics block, when the sales service includes one.
    pub fn estatisticas(&self) -> Option<&Value> {
        self.raw.get("estatisticas").filter(|v| v.is_object())
    }
}

/// Client for the sales collaborator's paginated listing endpoint.
#[derive(Debug, Clone)]
pub struct VendasClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl VendasClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            timeout,
        }
    }

    /// Fetch one page of sales, optionally bounded by an inclusive start
    /// date and an end date (the upstream treats it as exclusive of the
    /// following day).
    pub async fn fetch_pagina(
        &self,
        data_inicio: Option<NaiveDate>,
        data_fim: Option<NaiveDate>,
        skip: u32,
        limit: u32,
    ) -> Result<PaginaVendas, FetchError> {
        let url = format!("{}/vendas", self.base_url);
        let mut params: Vec<(&str, String)> = vec![
            ("skip", skip.to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(d) = data_inicio {
            params.push(("data_inicio", d.to_string()));
        }
        if let Some(d) = data_fim {
            params.push(("data_fim", d.to_string()));
        }

        debug!(service = SERVICE, %url, skip, limit, "fetching sales page");
        let resp = self
            .http
            .get(&url)
            .query(&params)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(SERVICE, e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(service = SERVICE, status = status.as_u16(), "sales service returned error");
            return Err(FetchError::Upstream {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        let raw = resp.json::<Value>().await.map_err(|e| FetchError::Malformed {
            service: SERVICE,
            detail: e.to_string(),
        })?;
        Ok(PaginaVendas::new(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registros_probes_container_keys_in_order() {
        let page = PaginaVendas::new(json!({"vendas": [{"id": 1}], "items": []}));
        assert_eq!(page.registros().len(), 1);

        let page = PaginaVendas::new(json!({"items": [{"id": 1}, {"id": 2}]}));
        assert_eq!(page.registros().len(), 2);

        let page = PaginaVendas::new(json!({"results": [{"id": 3}]}));
        assert_eq!(page.registros().len(), 1);
    }

    #[test]
    fn registros_degrades_to_empty_on_unknown_shape() {
        let page = PaginaVendas::new(json!({"payload": [1, 2, 3]}));
        assert!(page.registros().is_empty());

        let page = PaginaVendas::new(json!("not even an object"));
        assert!(page.registros().is_empty());
    }

    #[test]
    fn estatisticas_requires_an_object() {
        let page = PaginaVendas::new(json!({"estatisticas": {"total_registros": 4}}));
        assert!(page.estatisticas().is_some());

        let page = PaginaVendas::new(json!({"estatisticas": null}));
        assert!(page.estatisticas().is_none());
    }
}
