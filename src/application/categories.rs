use std::sync::Arc;

use crate::application::{
    envelope::{Envelope, Payload},
    error::ServiceError,
    pagination::{PAGE_PARAM, Paginator},
    read_through::{invalidate_after_write, read_through},
    repos::{CategoriesRepo, CategoriesWriteRepo, RepoError},
};
use crate::cache::{NamespaceCache, QueryParams};
use crate::domain::categories::CategoryInput;
use crate::domain::entities::CategoryRecord;

pub const LIST_PATH: &str = "/categories/";

pub const LISTED: &str = "Categories retrieved successfully.";
pub const RETRIEVED: &str = "Category retrieved successfully.";
pub const CREATED: &str = "Category created successfully.";
pub const UPDATED: &str = "Category updated successfully.";
pub const NOT_FOUND: &str = "Category not found.";

#[derive(Clone)]
pub struct CategoryService {
    reader: Arc<dyn CategoriesRepo>,
    writer: Arc<dyn CategoriesWriteRepo>,
    cache: NamespaceCache,
    paginator: Paginator,
}

impl CategoryService {
    pub fn new(
        reader: Arc<dyn CategoriesRepo>,
        writer: Arc<dyn CategoriesWriteRepo>,
        cache: NamespaceCache,
        paginator: Paginator,
    ) -> Self {
        Self {
            reader,
            writer,
            cache,
            paginator,
        }
    }

    pub async fn list(&self, params: &QueryParams) -> Result<Payload, ServiceError> {
        let page = Paginator::requested_page(params)?;
        let mut key_params = params.clone();
        key_params.set(PAGE_PARAM, page.to_string());
        let key = self.cache.key(&key_params);

        read_through(&self.cache, &key, || async move {
            let count = self.reader.count_categories().await?;
            let window = self.paginator.window(page, count)?;
            let categories = self.reader.list_categories(window).await?;
            let meta = self.paginator.meta(LIST_PATH, params, page, count);
            Ok(Payload::render(&Envelope::page(LISTED, categories, meta))?)
        })
        .await
    }

    pub async fn retrieve(&self, id: i64) -> Result<Payload, ServiceError> {
        let key = self.cache.key(&detail_params(id));

        read_through(&self.cache, &key, || async move {
            let category = self
                .reader
                .find_category(id)
                .await?
                .ok_or_else(|| ServiceError::not_found(NOT_FOUND))?;
            Ok(Payload::render(&Envelope::ok(RETRIEVED, category))?)
        })
        .await
    }

    pub async fn create(&self, input: CategoryInput) -> Result<CategoryRecord, ServiceError> {
        let draft = input.validate()?;
        let category = self.writer.create_category(draft).await?;
        invalidate_after_write(&self.cache, "category.create").await?;
        Ok(category)
    }

    /// Full replacement of an existing category.
    pub async fn update(
        &self,
        id: i64,
        input: CategoryInput,
    ) -> Result<CategoryRecord, ServiceError> {
        if self.reader.find_category(id).await?.is_none() {
            return Err(ServiceError::not_found(NOT_FOUND));
        }

        let draft = input.validate()?;
        let category = self
            .writer
            .update_category(id, draft)
            .await
            .map_err(not_found_as(NOT_FOUND))?;
        invalidate_after_write(&self.cache, "category.update").await?;
        Ok(category)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.writer
            .delete_category(id)
            .await
            .map_err(not_found_as(NOT_FOUND))?;
        invalidate_after_write(&self.cache, "category.delete").await
    }
}

pub(crate) fn detail_params(id: i64) -> QueryParams {
    QueryParams::from_pairs([("id", id.to_string())])
}

pub(crate) fn not_found_as(message: &'static str) -> impl Fn(RepoError) -> ServiceError {
    move |err| match err {
        RepoError::NotFound => ServiceError::not_found(message),
        other => ServiceError::Repo(other),
    }
}
