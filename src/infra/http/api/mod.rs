pub mod error;
pub mod handlers;
pub mod models;
pub mod response;
pub mod state;

pub use state::ApiState;

use axum::{Router, routing::get};

use crate::infra::http::RouterState;

/// Resource routes. Each path is served with and without the trailing slash.
pub fn build_api_router() -> Router<RouterState> {
    let categories = get(handlers::list_categories).post(handlers::create_category);
    let category = get(handlers::get_category)
        .put(handlers::update_category)
        .delete(handlers::delete_category);
    let products = get(handlers::list_products).post(handlers::create_product);
    let product = get(handlers::get_product)
        .put(handlers::update_product)
        .delete(handlers::delete_product);

    Router::new()
        .route("/categories/", categories.clone())
        .route("/categories", categories)
        .route("/categories/{id}/", category.clone())
        .route("/categories/{id}", category)
        .route("/products/", products.clone())
        .route("/products", products)
        .route("/products/{id}/", product.clone())
        .route("/products/{id}", product)
}
