//! Request bodies accepted by the resource endpoints.

use serde::Deserialize;
use serde_json::Number;

use crate::domain::{categories::CategoryInput, products::ProductInput};

/// JSON scalar accepted where the domain expects numeric text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScalarInput {
    Number(Number),
    Text(String),
}

impl ScalarInput {
    pub fn into_text(self) -> String {
        match self {
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl From<CategoryRequest> for CategoryInput {
    fn from(request: CategoryRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<ScalarInput>,
    pub category: Option<ScalarInput>,
}

impl From<ProductRequest> for ProductInput {
    fn from(request: ProductRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            price: request.price.map(ScalarInput::into_text),
            category: request.category.map(ScalarInput::into_text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_request_accepts_numbers_and_strings() {
        let request: ProductRequest = serde_json::from_str(
            r#"{"name": "Chair", "price": 19.99, "category": "4"}"#,
        )
        .expect("valid body");
        let input = ProductInput::from(request);

        assert_eq!(input.price.as_deref(), Some("19.99"));
        assert_eq!(input.category.as_deref(), Some("4"));
        assert_eq!(input.description, None);
    }

    #[test]
    fn null_fields_are_absent() {
        let request: CategoryRequest =
            serde_json::from_str(r#"{"name": null, "description": null}"#).expect("valid body");
        assert!(request.name.is_none());
        assert!(request.description.is_none());
    }
}
