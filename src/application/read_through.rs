use std::future::Future;

use tracing::debug;

use super::{envelope::Payload, error::ServiceError};
use crate::cache::NamespaceCache;

/// Serve `key` from the cache, or render it with `load` and cache the result.
///
/// Errors from `load` are returned as-is and nothing is cached for them.
pub(crate) async fn read_through<F, Fut>(
    cache: &NamespaceCache,
    key: &str,
    load: F,
) -> Result<Payload, ServiceError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Payload, ServiceError>>,
{
    if let Some(body) = cache.get(key).await? {
        return Ok(Payload::cached(body));
    }

    let payload = load().await?;
    cache.put(key, payload.body()).await?;
    debug!(
        target = "catalog::application::read_through",
        namespace = cache.namespace(),
        key = key,
        bytes = payload.body().len(),
        "cached fresh response"
    );
    Ok(payload)
}

/// Invalidate after a successful write.
pub(crate) async fn invalidate_after_write(
    cache: &NamespaceCache,
    operation: &'static str,
) -> Result<(), ServiceError> {
    let deleted = cache.invalidate().await?;
    debug!(
        target = "catalog::application::read_through",
        namespace = cache.namespace(),
        operation = operation,
        deleted = deleted,
        "cache namespace invalidated"
    );
    Ok(())
}
