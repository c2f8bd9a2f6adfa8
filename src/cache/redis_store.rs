//! Redis cache store.
//!
//! Uses `redis::aio::ConnectionManager` for a multiplexed connection with
//! automatic reconnection. Pattern deletes walk the key space with `SCAN`.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::{debug, warn};

use super::{
    error::{CacheError, CacheResult},
    keys::KeyPrefix,
    store::CacheStore,
};

const SCAN_BATCH: usize = 100;

#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
    prefix: KeyPrefix,
    ttl: Option<Duration>,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("connection", &"ConnectionManager")
            .field("prefix", &self.prefix)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl RedisStore {
    pub async fn connect(url: &str, prefix: KeyPrefix, ttl: Option<Duration>) -> CacheResult<Self> {
        let client = redis::Client::open(url).map_err(|err| {
            CacheError::connection(format!("failed to create Redis client: {err}"))
        })?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|err| CacheError::connection(format!("failed to connect to Redis: {err}")))?;

        debug!(url = %redact_url(url), prefix = prefix.as_str(), "Redis cache store connected");

        Ok(Self {
            connection,
            prefix,
            ttl,
        })
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let qualified = self.prefix.qualify(key);
        let mut conn = self.connection.clone();
        let value: Option<String> = redis::cmd("GET")
            .arg(&qualified)
            .query_async(&mut conn)
            .await
            .map_err(|err| CacheError::backend(format!("Redis GET failed: {err}")))?;

        if value.is_some() {
            debug!(key = %qualified, "Cache HIT");
        } else {
            debug!(key = %qualified, "Cache MISS");
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        let qualified = self.prefix.qualify(key);
        let mut conn = self.connection.clone();

        let mut command = redis::cmd("SET");
        command.arg(&qualified).arg(value);
        if let Some(ttl) = self.ttl {
            command.arg("EX").arg(ttl.as_secs().max(1));
        }

        command
            .query_async::<()>(&mut conn)
            .await
            .map_err(|err| CacheError::backend(format!("Redis SET failed: {err}")))?;

        debug!(
            key = %qualified,
            ttl_seconds = self.ttl.map(|ttl| ttl.as_secs()),
            "Cache SET"
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let qualified = self.prefix.qualify(key);
        let mut conn = self.connection.clone();

        let _removed: u64 = redis::cmd("DEL")
            .arg(&qualified)
            .query_async(&mut conn)
            .await
            .map_err(|err| CacheError::backend(format!("Redis DEL failed: {err}")))?;

        debug!(key = %qualified, "Cache DEL");
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> CacheResult<u64> {
        let qualified = self.prefix.qualify_pattern(pattern);
        let mut conn = self.connection.clone();
        let mut deleted: u64 = 0;
        let mut cursor: u64 = 0;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&qualified)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(|err| CacheError::backend(format!("Redis SCAN failed: {err}")))?;

            for key in keys {
                let outcome: redis::RedisResult<u64> =
                    redis::cmd("DEL").arg(&key).query_async(&mut conn).await;
                match outcome {
                    Ok(removed) => deleted += removed,
                    Err(err) => warn!(
                        target = "catalog::cache::redis",
                        key = %key,
                        error = %err,
                        "skipping key after failed pattern delete"
                    ),
                }
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        debug!(pattern = %qualified, deleted = deleted, "Cache pattern DEL");
        Ok(deleted)
    }

    async fn health_check(&self) -> CacheResult<bool> {
        let mut conn = self.connection.clone();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|err| CacheError::backend(format!("Redis PING failed: {err}")))?;

        Ok(pong == "PONG")
    }

    fn provider_name(&self) -> &'static str {
        "redis"
    }
}

/// Hide the password in a Redis URL before it is logged.
pub(crate) fn redact_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@')
        && let Some(colon_pos) = url[..at_pos].rfind(':')
    {
        let scheme_end = url.find("://").map(|pos| pos + 3).unwrap_or(0);
        if colon_pos >= scheme_end {
            return format!("{}***{}", &url[..=colon_pos], &url[at_pos..]);
        }
    }
    url.to_string()
}
