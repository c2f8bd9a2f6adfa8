use std::error::Error as StdError;

use axum::{http::StatusCode, response::Response};
use thiserror::Error;

use crate::{
    application::{pagination::PaginationError, repos::RepoError},
    cache::CacheError,
    domain::{error::DomainError, validation::FieldErrors},
    infra::error::InfraError,
};

#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// Failures surfaced by the catalog services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    NotFound { message: &'static str },
    #[error("validation failed on {}", .0.summary())]
    Validation(FieldErrors),
    #[error("invalid filter parameters: {0}")]
    InvalidFilter(String),
    #[error(transparent)]
    InvalidPage(#[from] PaginationError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("failed to serialize response: {0}")]
    Render(#[from] serde_json::Error),
}

impl ServiceError {
    pub fn not_found(message: &'static str) -> Self {
        Self::NotFound { message }
    }
}

impl From<DomainError> for ServiceError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::Validation { errors } => Self::Validation(errors),
        }
    }
}

/// Failures that abort the binary before or outside request handling.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
