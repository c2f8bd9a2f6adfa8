use serde::{Serialize, Serializer};
use sqlx::types::BigDecimal;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use super::validation::PRICE_DECIMAL_PLACES;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRecord {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRecord {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(serialize_with = "serialize_price")]
    pub price: BigDecimal,
    #[serde(rename = "category")]
    pub category_id: i64,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: OffsetDateTime,
    #[serde(serialize_with = "serialize_timestamp")]
    pub updated_at: OffsetDateTime,
}

fn serialize_price<S>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.with_scale(PRICE_DECIMAL_PLACES).to_string())
}

fn serialize_timestamp<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let formatted = value
        .format(&Rfc3339)
        .map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&formatted)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;
    use time::macros::datetime;

    use super::*;

    #[test]
    fn product_serializes_wire_shape() {
        let product = ProductRecord {
            id: 3,
            name: "Lamp".to_string(),
            description: None,
            price: BigDecimal::from_str("100").expect("decimal"),
            category_id: 9,
            created_at: datetime!(2024-05-01 10:30:00 UTC),
            updated_at: datetime!(2024-05-02 08:00:00 UTC),
        };

        let value = serde_json::to_value(&product).expect("serialize");
        assert_eq!(
            value,
            json!({
                "id": 3,
                "name": "Lamp",
                "description": null,
                "price": "100.00",
                "category": 9,
                "created_at": "2024-05-01T10:30:00Z",
                "updated_at": "2024-05-02T08:00:00Z",
            })
        );
    }
}
