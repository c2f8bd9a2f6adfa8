use thiserror::Error;

use super::validation::FieldErrors;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("domain validation failed: {}", .errors.summary())]
    Validation { errors: FieldErrors },
}

impl DomainError {
    pub fn validation(errors: FieldErrors) -> Self {
        Self::Validation { errors }
    }

    /// Validation failure on a single field.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::default();
        errors.push(field, message);
        Self::Validation { errors }
    }
}
