//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use sqlx::types::BigDecimal;
use thiserror::Error;

use crate::application::pagination::PageWindow;
use crate::domain::categories::CategoryDraft;
use crate::domain::entities::{CategoryRecord, ProductRecord};
use crate::domain::products::ProductDraft;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Product list filters. `None` leaves the dimension unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQueryFilter {
    /// Case-insensitive substring of the owning category's name.
    pub category: Option<String>,
    pub price_min: Option<BigDecimal>,
    pub price_max: Option<BigDecimal>,
}

#[async_trait]
pub trait CategoriesRepo: Send + Sync {
    async fn count_categories(&self) -> Result<u64, RepoError>;

    async fn list_categories(&self, window: PageWindow) -> Result<Vec<CategoryRecord>, RepoError>;

    async fn find_category(&self, id: i64) -> Result<Option<CategoryRecord>, RepoError>;
}

#[async_trait]
pub trait CategoriesWriteRepo: Send + Sync {
    async fn create_category(&self, draft: CategoryDraft) -> Result<CategoryRecord, RepoError>;

    /// Fails with [`RepoError::NotFound`] when no row has `id`.
    async fn update_category(
        &self,
        id: i64,
        draft: CategoryDraft,
    ) -> Result<CategoryRecord, RepoError>;

    /// Deletes the category and, by cascade, its products.
    async fn delete_category(&self, id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait ProductsRepo: Send + Sync {
    async fn count_products(&self, filter: &ProductQueryFilter) -> Result<u64, RepoError>;

    async fn list_products(
        &self,
        filter: &ProductQueryFilter,
        window: PageWindow,
    ) -> Result<Vec<ProductRecord>, RepoError>;

    async fn find_product(&self, id: i64) -> Result<Option<ProductRecord>, RepoError>;
}

#[async_trait]
pub trait ProductsWriteRepo: Send + Sync {
    async fn create_product(&self, draft: ProductDraft) -> Result<ProductRecord, RepoError>;

    async fn update_product(&self, id: i64, draft: ProductDraft)
    -> Result<ProductRecord, RepoError>;

    async fn delete_product(&self, id: i64) -> Result<(), RepoError>;
}

/// Liveness check for the backing database.
#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}
