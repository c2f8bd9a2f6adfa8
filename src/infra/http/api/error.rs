use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::application::{
    envelope::Envelope,
    error::{ErrorReport, ServiceError},
};
use crate::domain::validation::FieldErrors;

pub mod messages {
    pub const VALIDATION_FAILED: &str = "Validation error occurred.";
    pub const INVALID_FILTER: &str = "Invalid filter parameters.";
    pub const INVALID_PAGE: &str = "Invalid page.";
}

const SOURCE: &str = "infra::http::api";

/// Error rendered as a `{success: false, message, data}` envelope.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    data: Option<Value>,
    report: ErrorReport,
}

impl ApiError {
    fn new(
        status: StatusCode,
        message: impl Into<String>,
        data: Option<Value>,
        report: ErrorReport,
    ) -> Self {
        Self {
            status,
            message: message.into(),
            data,
            report,
        }
    }

    pub fn not_found(message: &'static str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            message,
            None,
            ErrorReport::from_message(SOURCE, StatusCode::NOT_FOUND, message),
        )
    }

    pub fn validation(errors: &FieldErrors) -> Self {
        let data = serde_json::to_value(errors).ok();
        Self::new(
            StatusCode::BAD_REQUEST,
            messages::VALIDATION_FAILED,
            data,
            ErrorReport::from_message(
                SOURCE,
                StatusCode::BAD_REQUEST,
                format!("validation failed on {}", errors.summary()),
            ),
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        match &error {
            ServiceError::NotFound { message } => Self::not_found(*message),
            ServiceError::Validation(errors) => Self::validation(errors),
            ServiceError::InvalidFilter(_) => Self::new(
                StatusCode::BAD_REQUEST,
                messages::INVALID_FILTER,
                None,
                ErrorReport::from_error(SOURCE, StatusCode::BAD_REQUEST, &error),
            ),
            ServiceError::InvalidPage(_) => Self::new(
                StatusCode::BAD_REQUEST,
                messages::INVALID_PAGE,
                None,
                ErrorReport::from_error(SOURCE, StatusCode::BAD_REQUEST, &error),
            ),
            ServiceError::Repo(_) | ServiceError::Cache(_) | ServiceError::Render(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                error.to_string(),
                None,
                ErrorReport::from_error(SOURCE, StatusCode::INTERNAL_SERVER_ERROR, &error),
            ),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let mut errors = FieldErrors::default();
        errors.push("non_field_errors", rejection.body_text());
        Self::validation(&errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Envelope::failure(&self.message, self.data);
        let mut response = (self.status, Json(body)).into_response();
        self.report.attach(&mut response);
        response
    }
}
