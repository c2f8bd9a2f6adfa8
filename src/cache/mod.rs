//! Response cache.
//!
//! Read handlers look up a key derived from the resource namespace and the
//! request's query parameters before touching the database, and store the
//! serialized response on a miss. Writes invalidate the whole namespace by
//! glob pattern.
//!
//! ```toml
//! [cache]
//! backend = "redis"        # or "memory"
//! url = "redis://127.0.0.1:6379"
//! key_prefix = "catalog"
//! ```

mod config;
mod error;
mod invalidation;
mod keys;
mod lock;
mod memory;
mod namespace;
mod pattern;
mod redis_store;
mod store;

pub use config::{CacheBackend, connect};
pub use error::{CacheError, CacheResult};
pub use invalidation::{invalidate_namespace, invalidate_pattern};
pub use keys::{
    CATEGORIES_NAMESPACE, KeyPrefix, PRODUCTS_NAMESPACE, QueryParams, derive_key,
    namespace_pattern,
};
pub use memory::MemoryStore;
pub use namespace::NamespaceCache;
pub use pattern::{escape_glob, glob_match, literal_prefix};
pub use redis_store::RedisStore;
pub use store::CacheStore;
