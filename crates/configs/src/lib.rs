use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstreams: UpstreamsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8084, worker_threads: Some(4) }
    }
}

/// Base URLs and timeouts for the upstream collaborators.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamsConfig {
    #[serde(default = "default_vendas_url")]
    pub vendas_url: String,
    #[serde(default = "default_produtos_url")]
    pub produtos_url: String,
    #[serde(default = "default_funcionarios_url")]
    pub funcionarios_url: String,
    /// Timeout for paginated sales fetches, seconds.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// Timeout for best-effort enrichment lookups, seconds.
    #[serde(default = "default_enrich_timeout")]
    pub enrich_timeout_secs: u64,
}

impl Default for UpstreamsConfig {
    fn default() -> Self {
        Self {
            vendas_url: default_vendas_url(),
            produtos_url: default_produtos_url(),
            funcionarios_url: default_funcionarios_url(),
            fetch_timeout_secs: default_fetch_timeout(),
            enrich_timeout_secs: default_enrich_timeout(),
        }
    }
}

fn default_vendas_url() -> String { "http://localhost:8000/api/v1".to_string() }
fn default_produtos_url() -> String { "http://localhost:8001/api/v1".to_string() }
fn default_funcionarios_url() -> String { "http://localhost:8002/api/v1".to_string() }
fn default_fetch_timeout() -> u64 { 10 }
fn default_enrich_timeout() -> u64 { 5 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default().unwrap_or_default();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.upstreams.normalize_from_env();
        self.upstreams.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl UpstreamsConfig {
    /// Environment variables win over the TOML file so deployments can point
    /// at the collaborators without shipping a config file.
    pub fn normalize_from_env(&mut self) {
        if let Ok(url) = std::env::var("MS_VENDAS_URL") {
            self.vendas_url = url;
        }
        if let Ok(url) = std::env::var("MS_PRODUTOS_URL") {
            self.produtos_url = url;
        }
        if let Ok(url) = std::env::var("MS_FUNCIONARIOS_URL") {
            self.funcionarios_url = url;
        }
        for url in [&mut self.vendas_url, &mut self.produtos_url, &mut self.funcionarios_url] {
            while url.ends_with('/') {
                url.pop();
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("upstreams.vendas_url", &self.vendas_url),
            ("upstreams.produtos_url", &self.produtos_url),
            ("upstreams.funcionarios_url", &self.funcionarios_url),
        ] {
            if url.trim().is_empty() {
                return Err(anyhow!("{} is empty; set it in config.toml or the environment", name));
            }
            let lower = url.to_lowercase();
            if !(lower.starts_with("http://") || lower.starts_with("https://")) {
                return Err(anyhow!("{} must start with http:// or https://", name));
            }
        }
        if self.fetch_timeout_secs == 0 || self.enrich_timeout_secs == 0 {
            return Err(anyhow!("upstream timeouts must be positive integer seconds"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let mut cfg = AppConfig::default();
        cfg.normalize_and_validate().expect("default config validates");
        assert_eq!(cfg.upstreams.fetch_timeout_secs, 10);
        assert_eq!(cfg.upstreams.enrich_timeout_secs, 5);
    }

    #[test]
    fn trailing_slashes_are_stripped() {
        let mut cfg = UpstreamsConfig {
            vendas_url: "http://vendas:8000/api/v1/".into(),
            ..Default::default()
        };
        cfg.normalize_from_env();
        assert_eq!(cfg.vendas_url, "http://vendas:8000/api/v1");
    }

    #[test]
    fn rejects_non_http_urls() {
        let cfg = UpstreamsConfig {
            produtos_url: "ftp://wrong".into(),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn parses_toml_sections() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9090

            [upstreams]
            vendas_url = "http://vendas/api/v1"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.upstreams.vendas_url, "http://vendas/api/v1");
        assert_eq!(cfg.upstreams.produtos_url, default_produtos_url());
    }
}
