//! Pattern invalidation over a cache store.

use metrics::counter;
use tracing::debug;

use super::{error::CacheResult, keys::namespace_pattern, store::CacheStore};

pub(crate) const METRIC_CACHE_INVALIDATED_KEYS: &str = "catalog_cache_invalidated_keys_total";

/// Delete every cached entry whose key matches `pattern`.
pub async fn invalidate_pattern(store: &dyn CacheStore, pattern: &str) -> CacheResult<u64> {
    let deleted = store.delete_pattern(pattern).await?;
    counter!(METRIC_CACHE_INVALIDATED_KEYS).increment(deleted);
    debug!(
        target = "catalog::cache::invalidation",
        provider = store.provider_name(),
        pattern = pattern,
        deleted = deleted,
        "cache pattern invalidated"
    );
    Ok(deleted)
}

/// Drop every list and detail entry cached under `namespace`.
pub async fn invalidate_namespace(store: &dyn CacheStore, namespace: &str) -> CacheResult<u64> {
    invalidate_pattern(store, &namespace_pattern(namespace)).await
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;
    use crate::cache::{KeyPrefix, MemoryStore, QueryParams, derive_key};

    #[tokio::test]
    async fn namespace_invalidation_drops_list_and_detail_keys() {
        let store = MemoryStore::new(NonZeroUsize::new(16).expect("non-zero"), KeyPrefix::new("t"));
        let list = derive_key("products", &QueryParams::parse(Some("page=1")));
        let detail = derive_key("products", &QueryParams::from_pairs([("id", "3")]));
        let unrelated = derive_key("productsextra", &QueryParams::new());
        for key in [&list, &detail, &unrelated] {
            store.set(key, "cached").await.expect("set");
        }

        let deleted = invalidate_namespace(&store, "products").await.expect("invalidate");
        assert_eq!(deleted, 2);
        assert!(store.get(&unrelated).await.expect("get").is_some());
    }
}
