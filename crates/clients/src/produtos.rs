use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use common::json::first_str;

/// Client for the products collaborator's single-entity read endpoint.
/// Lookups are best-effort: any failure resolves to `None`.
#[derive(Debug, Clone)]
pub struct ProdutosClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ProdutosClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            timeout,
        }
    }

    /// Display title of a product, read from `titulo` then `nome`.
    pub async fn titulo(&self, id: i64) -> Option<String> {
        let url = format!("{}/produtos/{}", self.base_url, id);
        let resp = self.http.get(&url).timeout(self.timeout).send().await.ok()?;
        if !resp.status().is_success() {
            debug!(produto_id = id, status = resp.status().as_u16(), "product lookup failed");
            return None;
        }
        let body = resp.json::<Value>().await.ok()?;
        first_str(&body, &["titulo", "nome"]).map(str::to_owned)
    }
}
