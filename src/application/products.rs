use std::sync::Arc;

use sqlx::types::BigDecimal;

use crate::application::{
    categories::{detail_params, not_found_as},
    envelope::{Envelope, Payload},
    error::ServiceError,
    pagination::{PAGE_PARAM, Paginator},
    read_through::{invalidate_after_write, read_through},
    repos::{CategoriesRepo, ProductQueryFilter, ProductsRepo, ProductsWriteRepo, RepoError},
};
use crate::cache::{NamespaceCache, QueryParams};
use crate::domain::entities::ProductRecord;
use crate::domain::error::DomainError;
use crate::domain::products::{ProductDraft, ProductInput, unknown_category_message};
use crate::domain::validation::parse_price;

pub const LIST_PATH: &str = "/products/";

pub const LISTED: &str = "Products retrieved successfully.";
pub const RETRIEVED: &str = "Product retrieved successfully.";
pub const CREATED: &str = "Product created successfully.";
pub const UPDATED: &str = "Product updated successfully.";
pub const NOT_FOUND: &str = "Product not found.";

pub const CATEGORY_FILTER: &str = "category";
pub const PRICE_MIN_FILTER: &str = "price_min";
pub const PRICE_MAX_FILTER: &str = "price_max";

#[derive(Clone)]
pub struct ProductService {
    reader: Arc<dyn ProductsRepo>,
    writer: Arc<dyn ProductsWriteRepo>,
    categories: Arc<dyn CategoriesRepo>,
    cache: NamespaceCache,
    paginator: Paginator,
}

impl ProductService {
    pub fn new(
        reader: Arc<dyn ProductsRepo>,
        writer: Arc<dyn ProductsWriteRepo>,
        categories: Arc<dyn CategoriesRepo>,
        cache: NamespaceCache,
        paginator: Paginator,
    ) -> Self {
        Self {
            reader,
            writer,
            categories,
            cache,
            paginator,
        }
    }

    pub async fn list(&self, params: &QueryParams) -> Result<Payload, ServiceError> {
        let filter = parse_filter(params)?;
        let page = Paginator::requested_page(params)?;
        let mut key_params = params.clone();
        key_params.set(PAGE_PARAM, page.to_string());
        let key = self.cache.key(&key_params);

        read_through(&self.cache, &key, || async move {
            let count = self.reader.count_products(&filter).await?;
            let window = self.paginator.window(page, count)?;
            let products = self.reader.list_products(&filter, window).await?;
            let meta = self.paginator.meta(LIST_PATH, params, page, count);
            Ok(Payload::render(&Envelope::page(LISTED, products, meta))?)
        })
        .await
    }

    pub async fn retrieve(&self, id: i64) -> Result<Payload, ServiceError> {
        let key = self.cache.key(&detail_params(id));

        read_through(&self.cache, &key, || async move {
            let product = self
                .reader
                .find_product(id)
                .await?
                .ok_or_else(|| ServiceError::not_found(NOT_FOUND))?;
            Ok(Payload::render(&Envelope::ok(RETRIEVED, product))?)
        })
        .await
    }

    pub async fn create(&self, input: ProductInput) -> Result<ProductRecord, ServiceError> {
        let draft = self.validate(&input).await?;
        let category_id = draft.category_id;
        let product = self
            .writer
            .create_product(draft)
            .await
            .map_err(|err| reference_error(err, category_id))?;
        invalidate_after_write(&self.cache, "product.create").await?;
        Ok(product)
    }

    /// Full replacement of an existing product.
    pub async fn update(&self, id: i64, input: ProductInput) -> Result<ProductRecord, ServiceError> {
        if self.reader.find_product(id).await?.is_none() {
            return Err(ServiceError::not_found(NOT_FOUND));
        }

        let draft = self.validate(&input).await?;
        let category_id = draft.category_id;
        let product = self
            .writer
            .update_product(id, draft)
            .await
            .map_err(|err| match err {
                RepoError::NotFound => ServiceError::not_found(NOT_FOUND),
                other => reference_error(other, category_id),
            })?;
        invalidate_after_write(&self.cache, "product.update").await?;
        Ok(product)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.writer
            .delete_product(id)
            .await
            .map_err(not_found_as(NOT_FOUND))?;
        invalidate_after_write(&self.cache, "product.delete").await
    }

    async fn validate(&self, input: &ProductInput) -> Result<ProductDraft, ServiceError> {
        let draft = input.validate()?;
        if self.categories.find_category(draft.category_id).await?.is_none() {
            return Err(unknown_category(draft.category_id));
        }
        Ok(draft)
    }
}

/// Decode the list filters. Blank values are ignored.
pub fn parse_filter(params: &QueryParams) -> Result<ProductQueryFilter, ServiceError> {
    let category = non_blank(params, CATEGORY_FILTER).map(str::to_string);
    let price_min = price_bound(params, PRICE_MIN_FILTER)?;
    let price_max = price_bound(params, PRICE_MAX_FILTER)?;

    Ok(ProductQueryFilter {
        category,
        price_min,
        price_max,
    })
}

fn non_blank<'a>(params: &'a QueryParams, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn price_bound(params: &QueryParams, name: &str) -> Result<Option<BigDecimal>, ServiceError> {
    non_blank(params, name)
        .map(|raw| {
            parse_price(raw).map_err(|reason| {
                ServiceError::InvalidFilter(format!("`{name}` = `{raw}`: {reason}"))
            })
        })
        .transpose()
}

fn unknown_category(category_id: i64) -> ServiceError {
    DomainError::field("category", unknown_category_message(category_id)).into()
}

/// A foreign-key failure means the category vanished between validation and write.
fn reference_error(err: RepoError, category_id: i64) -> ServiceError {
    match err {
        RepoError::InvalidInput { .. } => unknown_category(category_id),
        other => ServiceError::Repo(other),
    }
}
