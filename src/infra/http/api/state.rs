use std::sync::Arc;

use crate::application::{
    categories::CategoryService,
    pagination::Paginator,
    products::ProductService,
    repos::{CategoriesRepo, CategoriesWriteRepo, ProductsRepo, ProductsWriteRepo},
};
use crate::cache::{CATEGORIES_NAMESPACE, CacheStore, NamespaceCache, PRODUCTS_NAMESPACE};

#[derive(Clone)]
pub struct ApiState {
    pub categories: Arc<CategoryService>,
    pub products: Arc<ProductService>,
}

impl ApiState {
    /// Wire both resource services over one repository set and one cache store.
    ///
    /// Product responses embed category data, so category writes also drop
    /// the products namespace.
    pub fn new<R>(repos: Arc<R>, store: Arc<dyn CacheStore>, paginator: Paginator) -> Self
    where
        R: CategoriesRepo + CategoriesWriteRepo + ProductsRepo + ProductsWriteRepo + 'static,
    {
        let category_reader: Arc<dyn CategoriesRepo> = repos.clone();
        let category_writer: Arc<dyn CategoriesWriteRepo> = repos.clone();
        let product_reader: Arc<dyn ProductsRepo> = repos.clone();
        let product_writer: Arc<dyn ProductsWriteRepo> = repos;

        let category_cache = NamespaceCache::new(store.clone(), CATEGORIES_NAMESPACE)
            .with_dependents(&[PRODUCTS_NAMESPACE]);
        let product_cache = NamespaceCache::new(store, PRODUCTS_NAMESPACE);

        let categories = CategoryService::new(
            category_reader.clone(),
            category_writer,
            category_cache,
            paginator,
        );
        let products = ProductService::new(
            product_reader,
            product_writer,
            category_reader,
            product_cache,
            paginator,
        );

        Self {
            categories: Arc::new(categories),
            products: Arc::new(products),
        }
    }
}
