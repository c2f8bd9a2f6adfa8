mod categories;
mod products;

pub use categories::{
    create_category, delete_category, get_category, list_categories, update_category,
};
pub use products::{create_product, delete_product, get_product, list_products, update_product};

use super::error::ApiError;

/// Identifiers that are not integers cannot name a row, so they read as absent.
fn parse_id(raw: &str, not_found: &'static str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::not_found(not_found))
}
