//! Cache backend selection and store construction.

use std::{fmt, str::FromStr, sync::Arc};

use tracing::info;

use crate::config::CacheSettings;

use super::{
    error::CacheResult, keys::KeyPrefix, memory::MemoryStore, redis_store::RedisStore,
    store::CacheStore,
};

/// Which store adapter backs the response cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheBackend {
    #[default]
    Redis,
    Memory,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown cache backend `{other}` (expected redis|memory)")),
        }
    }
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Redis => "redis",
            Self::Memory => "memory",
        })
    }
}

/// Build the store adapter selected by `settings.backend`.
pub async fn connect(settings: &CacheSettings) -> CacheResult<Arc<dyn CacheStore>> {
    let prefix = KeyPrefix::new(&settings.key_prefix);
    let store: Arc<dyn CacheStore> = match settings.backend {
        CacheBackend::Redis => {
            Arc::new(RedisStore::connect(&settings.url, prefix, settings.ttl).await?)
        }
        CacheBackend::Memory => Arc::new(MemoryStore::new(settings.memory_capacity, prefix)),
    };

    info!(
        target = "catalog::cache",
        provider = store.provider_name(),
        key_prefix = %settings.key_prefix,
        ttl_seconds = settings.ttl.map(|ttl| ttl.as_secs()),
        "cache store ready"
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;

    fn memory_settings() -> CacheSettings {
        CacheSettings {
            backend: CacheBackend::Memory,
            url: "redis://unused".to_string(),
            key_prefix: "unit".to_string(),
            ttl: None,
            memory_capacity: NonZeroUsize::new(2).expect("non-zero"),
        }
    }

    #[test]
    fn backend_parses_case_insensitively() {
        assert_eq!("Memory".parse::<CacheBackend>(), Ok(CacheBackend::Memory));
        assert_eq!(" redis ".parse::<CacheBackend>(), Ok(CacheBackend::Redis));
        assert!("memcached".parse::<CacheBackend>().is_err());
    }

    #[tokio::test]
    async fn memory_backend_connects_without_network() {
        let store = connect(&memory_settings()).await.expect("memory store");
        assert_eq!(store.provider_name(), "memory");
        assert!(store.health_check().await.expect("health"));
    }

    #[tokio::test]
    async fn memory_backend_applies_prefix_and_capacity() {
        let store = connect(&memory_settings()).await.expect("memory store");

        for key in ["categories:page=1", "categories:page=2", "products:page=1"] {
            store.set(key, "{}").await.expect("set");
        }

        assert!(store.get("categories:page=1").await.expect("get").is_none());
        assert_eq!(
            store.get("products:page=1").await.expect("get").as_deref(),
            Some("{}")
        );
    }
}
