use sqlx::types::BigDecimal;

use super::{
    error::DomainError,
    validation::{self, FieldErrors, NAME_MAX_CHARS},
};

/// Unvalidated product payload. Numeric fields arrive as text so that JSON
/// numbers and numeric strings are handled alike.
#[derive(Debug, Clone, Default)]
pub struct ProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub category_id: i64,
}

impl ProductInput {
    /// Check field shapes. Whether `category` refers to an existing row is
    /// decided by the caller against the store.
    pub fn validate(&self) -> Result<ProductDraft, DomainError> {
        let mut errors = FieldErrors::default();
        let name =
            validation::required_text(&mut errors, "name", self.name.as_deref(), NAME_MAX_CHARS);
        let description = validation::optional_text(self.description.as_deref());
        let price = validation::price(&mut errors, "price", self.price.as_deref());
        let category_id = validation::reference(&mut errors, "category", self.category.as_deref());

        errors.into_result()?;
        match (name, price, category_id) {
            (Some(name), Some(price), Some(category_id)) => Ok(ProductDraft {
                name,
                description,
                price,
                category_id,
            }),
            _ => Err(DomainError::field("non_field_errors", "Invalid data.")),
        }
    }
}

/// Message reported when a product references a category that does not exist.
pub fn unknown_category_message(category_id: i64) -> String {
    format!("Invalid pk \"{category_id}\" - object does not exist.")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ProductInput {
        ProductInput {
            name: Some("Desk".to_string()),
            description: Some("Oak".to_string()),
            price: Some("249.9".to_string()),
            category: Some("4".to_string()),
        }
    }

    #[test]
    fn validate_builds_draft() {
        let draft = input().validate().expect("valid");
        assert_eq!(draft.name, "Desk");
        assert_eq!(draft.price.to_string(), "249.90");
        assert_eq!(draft.category_id, 4);
    }

    #[test]
    fn validate_collects_every_failing_field() {
        let payload = ProductInput {
            name: None,
            price: Some("abc".to_string()),
            ..input()
        };
        let err = payload.validate().expect_err("invalid");
        let DomainError::Validation { errors } = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.summary(), "name, price");
    }
}
