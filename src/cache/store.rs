//! Store adapter seam for the response cache.

use async_trait::async_trait;

use super::error::CacheResult;

/// Key-value store holding serialized responses.
///
/// Keys and patterns passed in are unqualified; adapters apply their
/// deployment prefix themselves.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// `Ok(None)` on a miss.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> CacheResult<()>;

    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Delete every key matching the glob `pattern` and return how many were removed.
    async fn delete_pattern(&self, pattern: &str) -> CacheResult<u64>;

    async fn health_check(&self) -> CacheResult<bool>;

    fn provider_name(&self) -> &'static str;
}
