use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use common::json::first_str;

/// Client for the employees collaborator's single-entity read endpoint.
/// Lookups are best-effort: any failure resolves to `None`.
#[derive(Debug, Clone)]
pub struct FuncionariosClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl FuncionariosClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            timeout,
        }
    }

    /// Display name of an employee, read from `nome` then `name`.
    pub async fn nome(&self, id: i64) -> Option<String> {
        let url = format!("{}/funcionarios/{}", self.base_url, id);
        let resp = self.http.get(&url).timeout(self.timeout).send().await.ok()?;
        if !resp.status().is_success() {
            debug!(funcionario_id = id, status = resp.status().as_u16(), "employee lookup failed");
            return None;
        }
        let body = resp.json::<Value>().await.ok()?;
        first_str(&body, &["nome", "name"]).map(str::to_owned)
    }
}
