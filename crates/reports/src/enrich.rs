//! Best-effort display-name enrichment with a bounded cache.
//!
//! Ranking rows are enriched with a human-readable name fetched from the
//! owning collaborator. The lookup must never fail the enclosing report, so
//! every error collapses to `None`; only successful lookups are memoized.

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use clients::{FuncionariosClient, ProdutosClient};

/// Distinct ids memoized per cache. Eviction beyond this is handled by moka
/// (LRU-flavored); evicted ids are simply re-fetched on the next miss.
pub const DEFAULT_CAPACITY: u64 = 512;

/// A collaborator that can resolve an entity id to a display name.
#[async_trait]
pub trait NameSource: Send + Sync {
    async fn display_name(&self, id: i64) -> Option<String>;
}

#[async_trait]
impl NameSource for ProdutosClient {
    async fn display_name(&self, id: i64) -> Option<String> {
        self.titulo(id).await
    }
}

#[async_trait]
impl NameSource for FuncionariosClient {
    async fn display_name(&self, id: i64) -> Option<String> {
        self.nome(id).await
    }
}

/// Memoized id → display-name lookup over an injected source.
///
/// Two concurrent misses on the same id may both hit the source; the second
/// insert wins, which is harmless since names are immutable once set.
#[derive(Clone)]
pub struct NameCache {
    source: Arc<dyn NameSource>,
    cache: Cache<i64, Arc<str>>,
}

impl NameCache {
    pub fn new(source: Arc<dyn NameSource>, capacity: u64) -> Self {
        Self { source, cache: Cache::new(capacity) }
    }

    /// Cached name, or fetch-and-memoize. Failed lookups yield `None` and
    /// are not cached, so a transient upstream hiccup does not pin a miss.
    pub async fn resolve(&self, id: i64) -> Option<String> {
        if let Some(hit) = self.cache.get(&id).await {
            return Some(hit.to_string());
        }
        let name = self.source.display_name(id).await?;
        debug!(id, "memoizing display name");
        self.cache.insert(id, Arc::from(name.as_str())).await;
        Some(name)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source stub that counts lookups.
    pub(crate) struct StubSource {
        pub names: HashMap<i64, String>,
        pub calls: AtomicUsize,
    }

    impl StubSource {
        pub fn with_names(pairs: &[(i64, &str)]) -> Self {
            Self {
                names: pairs.iter().map(|(id, n)| (*id, n.to_string())).collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl NameSource for StubSource {
        async fn display_name(&self, id: i64) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.names.get(&id).cloned()
        }
    }

    #[tokio::test]
    async fn resolve_memoiza_buscas_com_sucesso() {
        let source = Arc::new(StubSource::with_names(&[(1, "Caneta")]));
        let cache = NameCache::new(source.clone(), DEFAULT_CAPACITY);

        assert_eq!(cache.resolve(1).await.as_deref(), Some("Caneta"));
        assert_eq!(cache.resolve(1).await.as_deref(), Some("Caneta"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn resolve_nao_memoiza_falhas() {
        let source = Arc::new(StubSource::with_names(&[]));
        let cache = NameCache::new(source.clone(), DEFAULT_CAPACITY);

        assert_eq!(cache.resolve(9).await, None);
        assert_eq!(cache.resolve(9).await, None);
        // both misses reached the source: failures are not pinned
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn resolve_ids_distintos_sao_independentes() {
        let source = Arc::new(StubSource::with_names(&[(1, "a"), (2, "b")]));
        let cache = NameCache::new(source.clone(), DEFAULT_CAPACITY);

        assert_eq!(cache.resolve(1).await.as_deref(), Some("a"));
        assert_eq!(cache.resolve(2).await.as_deref(), Some("b"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
