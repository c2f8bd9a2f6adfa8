//! In-process cache store.
//!
//! An LRU map holds the values. A sorted key index mirrors its key set so
//! pattern deletes only walk keys sharing the pattern's literal prefix.

use std::{collections::BTreeSet, num::NonZeroUsize, sync::RwLock};

use async_trait::async_trait;
use lru::LruCache;
use tracing::debug;

use super::{
    error::CacheResult,
    keys::KeyPrefix,
    lock::{rw_read, rw_write},
    pattern::{glob_match, literal_prefix},
    store::CacheStore,
};

const SOURCE: &str = "cache::memory";

struct Entries {
    values: LruCache<String, String>,
    index: BTreeSet<String>,
}

pub struct MemoryStore {
    prefix: KeyPrefix,
    entries: RwLock<Entries>,
}

impl MemoryStore {
    pub fn new(capacity: NonZeroUsize, prefix: KeyPrefix) -> Self {
        Self {
            prefix,
            entries: RwLock::new(Entries {
                values: LruCache::new(capacity),
                index: BTreeSet::new(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove_matching(&self, pattern: &str) -> u64 {
        let qualified = self.prefix.qualify_pattern(pattern);
        let literal = literal_prefix(&qualified);

        let mut entries = rw_write(&self.entries, SOURCE, "delete_pattern");
        let matching: Vec<String> = entries
            .index
            .range(literal.clone()..)
            .take_while(|key| key.starts_with(&literal))
            .filter(|key| glob_match(&qualified, key))
            .cloned()
            .collect();

        let mut deleted = 0;
        for key in matching {
            entries.index.remove(&key);
            if entries.values.pop(&key).is_some() {
                deleted += 1;
            }
        }
        deleted
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let qualified = self.prefix.qualify(key);
        // `LruCache::get` promotes the entry, so this takes the write side.
        let value = rw_write(&self.entries, SOURCE, "get")
            .values
            .get(&qualified)
            .cloned();

        if value.is_some() {
            debug!(key = %qualified, "Cache HIT");
        } else {
            debug!(key = %qualified, "Cache MISS");
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        let qualified = self.prefix.qualify(key);
        {
            let mut entries = rw_write(&self.entries, SOURCE, "set");
            let displaced = entries.values.push(qualified.clone(), value.to_string());
            if let Some((evicted, _)) = displaced
                && evicted != qualified
            {
                debug!(key = %evicted, "Cache EVICT");
                entries.index.remove(&evicted);
            }
            entries.index.insert(qualified.clone());
        }

        debug!(key = %qualified, "Cache SET");
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let qualified = self.prefix.qualify(key);
        {
            let mut entries = rw_write(&self.entries, SOURCE, "delete");
            entries.values.pop(&qualified);
            entries.index.remove(&qualified);
        }

        debug!(key = %qualified, "Cache DEL");
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> CacheResult<u64> {
        let deleted = self.remove_matching(pattern);
        debug!(pattern = pattern, deleted = deleted, "Cache pattern DEL");
        Ok(deleted)
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(true)
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;

    fn store(capacity: usize) -> MemoryStore {
        MemoryStore::new(
            NonZeroUsize::new(capacity).expect("non-zero"),
            KeyPrefix::new("catalog"),
        )
    }

    #[tokio::test]
    async fn set_get_delete_round_trip() {
        let store = store(8);
        store
            .set("categories:page=1", "{\"success\":true}")
            .await
            .expect("set");
        assert_eq!(
            store.get("categories:page=1").await.expect("get").as_deref(),
            Some("{\"success\":true}")
        );

        store.delete("categories:page=1").await.expect("delete");
        assert_eq!(store.get("categories:page=1").await.expect("get"), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn delete_pattern_only_touches_matching_namespace() {
        let store = store(16);
        for key in [
            "categories:page=1",
            "categories:id=4",
            "products:page=1",
            "products:category=tools&page=1",
        ] {
            store.set(key, "cached").await.expect("set");
        }

        let deleted = store.delete_pattern("products:*").await.expect("delete");
        assert_eq!(deleted, 2);
        assert_eq!(store.get("products:page=1").await.expect("get"), None);
        assert!(store.get("categories:id=4").await.expect("get").is_some());
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn index_follows_lru_evictions() {
        let store = store(2);
        store.set("products:page=1", "a").await.expect("set");
        store.set("products:page=2", "b").await.expect("set");
        store.set("products:page=3", "c").await.expect("set");
        // Overwriting an existing key must not drop it from the index.
        store.set("products:page=3", "d").await.expect("set");

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("products:page=1").await.expect("get"), None);

        let deleted = store.delete_pattern("products:*").await.expect("delete");
        assert_eq!(deleted, 2);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn prefix_isolates_deployments() {
        let shared = store(4);
        let other = MemoryStore::new(NonZeroUsize::new(4).expect("non-zero"), KeyPrefix::new("x"));
        shared.set("products:page=1", "v").await.expect("set");
        other.set("products:page=1", "v").await.expect("set");

        assert_eq!(shared.delete_pattern("*").await.expect("delete"), 1);
        assert_eq!(other.len(), 1);
    }

    #[tokio::test]
    async fn recovers_from_poisoned_lock() {
        let store = Arc::new(store(4));
        store.set("categories:page=1", "kept").await.expect("set");

        let poisoner = Arc::clone(&store);
        let handle = thread::spawn(move || {
            let _guard = poisoner.entries.write().expect("lock");
            panic!("poison the cache lock");
        });
        assert!(handle.join().is_err());
        assert!(store.entries.is_poisoned());

        assert_eq!(
            store.get("categories:page=1").await.expect("get").as_deref(),
            Some("kept")
        );
        assert_eq!(store.delete_pattern("categories:*").await.expect("delete"), 1);
    }
}
