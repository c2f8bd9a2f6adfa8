use std::net::SocketAddr;

use thiserror::Error;

/// Startup and maintenance failures outside request handling.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("failed to bind catalog api on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog database url is not configured; set database.url or pass --database-url")]
    DatabaseUrlMissing,
    #[error("catalog database unavailable: {0}")]
    Database(#[source] sqlx::Error),
    #[error("catalog schema migration failed: {0}")]
    Migration(#[source] sqlx::Error),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
}

impl InfraError {
    pub fn bind(addr: SocketAddr, source: std::io::Error) -> Self {
        Self::Bind { addr, source }
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}
