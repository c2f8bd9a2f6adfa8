use std::sync::Arc;

use metrics::counter;

use super::{
    error::CacheResult,
    invalidation::invalidate_namespace,
    keys::{QueryParams, derive_key},
    store::CacheStore,
};

pub(crate) const METRIC_CACHE_HIT: &str = "catalog_cache_hit_total";
pub(crate) const METRIC_CACHE_MISS: &str = "catalog_cache_miss_total";

/// Cache-aside view of one resource namespace.
///
/// Writes to the resource invalidate its own namespace and every dependent
/// namespace whose cached responses embed the resource's data.
#[derive(Clone)]
pub struct NamespaceCache {
    store: Arc<dyn CacheStore>,
    namespace: &'static str,
    dependents: Vec<&'static str>,
}

impl NamespaceCache {
    pub fn new(store: Arc<dyn CacheStore>, namespace: &'static str) -> Self {
        Self {
            store,
            namespace,
            dependents: Vec::new(),
        }
    }

    pub fn with_dependents(mut self, dependents: &[&'static str]) -> Self {
        self.dependents.extend_from_slice(dependents);
        self
    }

    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    pub fn key(&self, params: &QueryParams) -> String {
        derive_key(self.namespace, params)
    }

    pub async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let value = self.store.get(key).await?;
        let metric = if value.is_some() {
            METRIC_CACHE_HIT
        } else {
            METRIC_CACHE_MISS
        };
        counter!(metric, "namespace" => self.namespace).increment(1);
        Ok(value)
    }

    pub async fn put(&self, key: &str, value: &str) -> CacheResult<()> {
        self.store.set(key, value).await
    }

    /// Invalidate this namespace and its dependents, returning the number of keys removed.
    pub async fn invalidate(&self) -> CacheResult<u64> {
        let mut deleted = invalidate_namespace(self.store.as_ref(), self.namespace).await?;
        for dependent in &self.dependents {
            deleted += invalidate_namespace(self.store.as_ref(), dependent).await?;
        }
        Ok(deleted)
    }
}
