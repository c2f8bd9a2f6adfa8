use thiserror::Error;

/// Errors raised by cache store adapters.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    Connection(String),
    #[error("cache operation timed out: {0}")]
    Timeout(String),
    #[error("cache backend error: {0}")]
    Backend(String),
}

impl CacheError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

pub type CacheResult<T> = Result<T, CacheError>;
