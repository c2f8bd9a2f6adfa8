#![allow(dead_code)]

use std::collections::BTreeMap;
use std::num::{NonZeroU32, NonZeroUsize};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use time::OffsetDateTime;
use tower::ServiceExt;

use catalog::application::pagination::{PageWindow, Paginator};
use catalog::application::repos::{
    CategoriesRepo, CategoriesWriteRepo, HealthRepo, ProductQueryFilter, ProductsRepo,
    ProductsWriteRepo, RepoError,
};
use catalog::cache::{CacheStore, KeyPrefix, MemoryStore};
use catalog::domain::categories::CategoryDraft;
use catalog::domain::entities::{CategoryRecord, ProductRecord};
use catalog::domain::products::ProductDraft;
use catalog::infra::http::{ApiState, HealthState, RouterState, build_router};

#[derive(Default)]
struct Tables {
    categories: BTreeMap<i64, CategoryRecord>,
    products: BTreeMap<i64, ProductRecord>,
    next_category_id: i64,
    next_product_id: i64,
}

/// Repository double with the same cascade and filter semantics as Postgres.
#[derive(Default)]
pub struct InMemoryCatalog {
    tables: Mutex<Tables>,
    reads: AtomicUsize,
}

impl InMemoryCatalog {
    /// Number of list/detail queries served so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }

    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().expect("tables lock")
    }
}

fn window<T: Clone>(rows: Vec<T>, window: PageWindow) -> Vec<T> {
    rows.into_iter()
        .skip(window.offset as usize)
        .take(window.limit as usize)
        .collect()
}

fn matches_filter(tables: &Tables, product: &ProductRecord, filter: &ProductQueryFilter) -> bool {
    if let Some(needle) = filter.category.as_ref() {
        let needle = needle.to_lowercase();
        let hit = tables
            .categories
            .get(&product.category_id)
            .is_some_and(|category| category.name.to_lowercase().contains(&needle));
        if !hit {
            return false;
        }
    }
    if let Some(min) = filter.price_min.as_ref() {
        if &product.price < min {
            return false;
        }
    }
    if let Some(max) = filter.price_max.as_ref() {
        if &product.price > max {
            return false;
        }
    }
    true
}

#[async_trait]
impl CategoriesRepo for InMemoryCatalog {
    async fn count_categories(&self) -> Result<u64, RepoError> {
        Ok(self.tables().categories.len() as u64)
    }

    async fn list_categories(&self, page: PageWindow) -> Result<Vec<CategoryRecord>, RepoError> {
        self.record_read();
        let rows = self.tables().categories.values().cloned().collect();
        Ok(window(rows, page))
    }

    async fn find_category(&self, id: i64) -> Result<Option<CategoryRecord>, RepoError> {
        self.record_read();
        Ok(self.tables().categories.get(&id).cloned())
    }
}

#[async_trait]
impl CategoriesWriteRepo for InMemoryCatalog {
    async fn create_category(&self, draft: CategoryDraft) -> Result<CategoryRecord, RepoError> {
        let mut tables = self.tables();
        tables.next_category_id += 1;
        let record = CategoryRecord {
            id: tables.next_category_id,
            name: draft.name,
            description: draft.description,
        };
        tables.categories.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_category(
        &self,
        id: i64,
        draft: CategoryDraft,
    ) -> Result<CategoryRecord, RepoError> {
        let mut tables = self.tables();
        let record = tables.categories.get_mut(&id).ok_or(RepoError::NotFound)?;
        record.name = draft.name;
        record.description = draft.description;
        Ok(record.clone())
    }

    async fn delete_category(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables();
        tables.categories.remove(&id).ok_or(RepoError::NotFound)?;
        tables.products.retain(|_, product| product.category_id != id);
        Ok(())
    }
}

#[async_trait]
impl ProductsRepo for InMemoryCatalog {
    async fn count_products(&self, filter: &ProductQueryFilter) -> Result<u64, RepoError> {
        let tables = self.tables();
        let count = tables
            .products
            .values()
            .filter(|product| matches_filter(&tables, product, filter))
            .count();
        Ok(count as u64)
    }

    async fn list_products(
        &self,
        filter: &ProductQueryFilter,
        page: PageWindow,
    ) -> Result<Vec<ProductRecord>, RepoError> {
        self.record_read();
        let tables = self.tables();
        let rows = tables
            .products
            .values()
            .filter(|product| matches_filter(&tables, product, filter))
            .cloned()
            .collect();
        Ok(window(rows, page))
    }

    async fn find_product(&self, id: i64) -> Result<Option<ProductRecord>, RepoError> {
        self.record_read();
        Ok(self.tables().products.get(&id).cloned())
    }
}

#[async_trait]
impl ProductsWriteRepo for InMemoryCatalog {
    async fn create_product(&self, draft: ProductDraft) -> Result<ProductRecord, RepoError> {
        let mut tables = self.tables();
        if !tables.categories.contains_key(&draft.category_id) {
            return Err(RepoError::InvalidInput {
                message: "products_category_id_fkey".to_string(),
            });
        }
        tables.next_product_id += 1;
        let now = OffsetDateTime::now_utc();
        let record = ProductRecord {
            id: tables.next_product_id,
            name: draft.name,
            description: draft.description,
            price: draft.price,
            category_id: draft.category_id,
            created_at: now,
            updated_at: now,
        };
        tables.products.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_product(
        &self,
        id: i64,
        draft: ProductDraft,
    ) -> Result<ProductRecord, RepoError> {
        let mut tables = self.tables();
        if !tables.categories.contains_key(&draft.category_id) {
            return Err(RepoError::InvalidInput {
                message: "products_category_id_fkey".to_string(),
            });
        }
        let record = tables.products.get_mut(&id).ok_or(RepoError::NotFound)?;
        record.name = draft.name;
        record.description = draft.description;
        record.price = draft.price;
        record.category_id = draft.category_id;
        record.updated_at = OffsetDateTime::now_utc();
        Ok(record.clone())
    }

    async fn delete_product(&self, id: i64) -> Result<(), RepoError> {
        self.tables()
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl HealthRepo for InMemoryCatalog {
    async fn ping(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub repos: Arc<InMemoryCatalog>,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_page_size(10)
    }

    pub fn with_page_size(page_size: u32) -> Self {
        let repos = Arc::new(InMemoryCatalog::default());
        let store = Arc::new(MemoryStore::new(
            NonZeroUsize::new(1_000).expect("capacity"),
            KeyPrefix::new("test"),
        ));
        let paginator = Paginator::new(NonZeroU32::new(page_size).expect("page size"));
        let cache: Arc<dyn CacheStore> = store.clone();

        let state = RouterState {
            health: HealthState {
                database: repos.clone(),
                cache: cache.clone(),
            },
            api: ApiState::new(repos.clone(), cache, paginator),
        };

        Self {
            router: build_router(state),
            repos,
            store,
        }
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("request");
        let response = self.router.clone().oneshot(request).await.expect("response");
        TestResponse::read(response).await
    }

    pub async fn send_raw(&self, method: Method, uri: &str, body: &'static str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .expect("request");
        let response = self.router.clone().oneshot(request).await.expect("response");
        TestResponse::read(response).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }

    /// Creates a category and returns its id.
    pub async fn category(&self, name: &str) -> i64 {
        let response = self
            .post("/categories/", serde_json::json!({ "name": name }))
            .await;
        assert_eq!(response.status, 201, "create category: {}", response.text);
        response.json()["data"]["id"].as_i64().expect("category id")
    }

    /// Creates a product and returns its id.
    pub async fn product(&self, name: &str, price: &str, category: i64) -> i64 {
        let response = self
            .post(
                "/products/",
                serde_json::json!({ "name": name, "price": price, "category": category }),
            )
            .await;
        assert_eq!(response.status, 201, "create product: {}", response.text);
        response.json()["data"]["id"].as_i64().expect("product id")
    }
}

pub struct TestResponse {
    pub status: u16,
    pub cache: Option<String>,
    pub content_type: Option<String>,
    pub text: String,
}

impl TestResponse {
    async fn read(response: Response<Body>) -> Self {
        let status = response.status().as_u16();
        let header_value = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        let cache = header_value("x-cache");
        let content_type = header_value("content-type");
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();

        Self {
            status,
            cache,
            content_type,
            text: String::from_utf8(bytes.to_vec()).expect("utf-8 body"),
        }
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text).expect("json body")
    }
}
