//! Field-level validation shared by the category and product inputs.
//!
//! Failures are collected per field so a single response can report every
//! problem with a payload, keyed by the wire field name.

use std::{collections::BTreeMap, str::FromStr};

use serde::Serialize;
use sqlx::types::BigDecimal;

use super::error::DomainError;

pub const NAME_MAX_CHARS: usize = 255;
pub const PRICE_MAX_DIGITS: i64 = 10;
pub const PRICE_DECIMAL_PLACES: i64 = 2;

pub(crate) const REQUIRED: &str = "This field is required.";
pub(crate) const BLANK: &str = "This field may not be blank.";

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Comma-separated list of offending fields, for logs.
    pub fn summary(&self) -> String {
        self.fields().collect::<Vec<_>>().join(", ")
    }

    pub fn into_result(self) -> Result<(), DomainError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation(self))
        }
    }
}

/// Validate a required, length-bounded text field. Surrounding whitespace is trimmed.
pub fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    max_chars: usize,
) -> Option<String> {
    let Some(value) = value else {
        errors.push(field, REQUIRED);
        return None;
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(field, BLANK);
        return None;
    }

    if trimmed.chars().count() > max_chars {
        errors.push(
            field,
            format!("Ensure this field has no more than {max_chars} characters."),
        );
        return None;
    }

    Some(trimmed.to_string())
}

/// Normalise optional free text: blank input is stored as absent.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}

/// Parse a monetary amount bounded to `NUMERIC(10, 2)`.
pub fn price(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> Option<BigDecimal> {
    let Some(raw) = value else {
        errors.push(field, REQUIRED);
        return None;
    };

    match parse_price(raw) {
        Ok(parsed) => Some(parsed),
        Err(message) => {
            errors.push(field, message);
            None
        }
    }
}

/// Parse `raw` as an amount that fits `NUMERIC(10, 2)`, rescaled to two places.
///
/// The digit limits are checked before rescaling, so exponent notation such
/// as `1e9223372036854775807` is rejected without materialising the value.
pub fn parse_price(raw: &str) -> Result<BigDecimal, String> {
    let parsed =
        BigDecimal::from_str(raw.trim()).map_err(|_| "A valid number is required.".to_string())?;

    let (total, decimals) = digit_counts(&parsed);
    if total > PRICE_MAX_DIGITS {
        return Err(format!(
            "Ensure that there are no more than {PRICE_MAX_DIGITS} digits in total."
        ));
    }
    if decimals > PRICE_DECIMAL_PLACES {
        return Err(format!(
            "Ensure that there are no more than {PRICE_DECIMAL_PLACES} decimal places."
        ));
    }
    if total - decimals > PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES {
        return Err(format!(
            "Ensure that there are no more than {} digits before the decimal point.",
            PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES
        ));
    }

    Ok(parsed.with_scale(PRICE_DECIMAL_PLACES))
}

/// Parse a primary-key reference to another entity.
pub fn reference(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> Option<i64> {
    let Some(raw) = value else {
        errors.push(field, REQUIRED);
        return None;
    };

    match raw.trim().parse::<i64>() {
        Ok(id) => Some(id),
        Err(_) => {
            errors.push(field, "Incorrect type. Expected pk value, received str.");
            None
        }
    }
}

/// Total significant digits and digits after the point, ignoring trailing zeros.
fn digit_counts(value: &BigDecimal) -> (i64, i64) {
    let (mantissa, scale) = value.normalized().as_bigint_and_exponent();
    let digits = mantissa.to_string().trim_start_matches('-').len() as i64;

    if scale <= 0 {
        (digits.saturating_sub(scale), 0)
    } else if digits > scale {
        (digits, scale)
    } else {
        (scale, scale)
    }
}
