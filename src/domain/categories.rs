use super::{
    error::DomainError,
    validation::{self, FieldErrors, NAME_MAX_CHARS},
};

/// Unvalidated category payload as received from a client.
#[derive(Debug, Clone, Default)]
pub struct CategoryInput {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Category fields that passed validation and can be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub description: Option<String>,
}

impl CategoryInput {
    pub fn validate(&self) -> Result<CategoryDraft, DomainError> {
        let mut errors = FieldErrors::default();
        let name =
            validation::required_text(&mut errors, "name", self.name.as_deref(), NAME_MAX_CHARS);
        let description = validation::optional_text(self.description.as_deref());

        errors.into_result()?;
        let Some(name) = name else {
            return Err(DomainError::field("name", validation::REQUIRED));
        };

        Ok(CategoryDraft { name, description })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_normalises_fields() {
        let input = CategoryInput {
            name: Some(" Garden ".to_string()),
            description: Some(String::new()),
        };
        let draft = input.validate().expect("valid");
        assert_eq!(draft.name, "Garden");
        assert_eq!(draft.description, None);
    }

    #[test]
    fn validate_reports_missing_name() {
        let err = CategoryInput::default().validate().expect_err("missing name");
        match err {
            DomainError::Validation { errors } => {
                assert_eq!(
                    errors.get("name"),
                    Some(&["This field is required.".to_string()][..])
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
