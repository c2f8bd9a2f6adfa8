//! Response envelope shared by every resource endpoint.

use serde::Serialize;

use super::pagination::PageMeta;

/// `{success, message, data}` plus `{count, next, previous}` on list pages.
#[derive(Debug, Serialize)]
pub struct Envelope<'a, T> {
    pub success: bool,
    pub message: &'a str,
    pub data: Option<T>,
    #[serde(flatten)]
    pub page: Option<PageMeta>,
}

impl<'a, T> Envelope<'a, T> {
    pub fn ok(message: &'a str, data: T) -> Self {
        Self {
            success: true,
            message,
            data: Some(data),
            page: None,
        }
    }

    pub fn page(message: &'a str, data: T, meta: PageMeta) -> Self {
        Self {
            success: true,
            message,
            data: Some(data),
            page: Some(meta),
        }
    }

    pub fn failure(message: &'a str, data: Option<T>) -> Self {
        Self {
            success: false,
            message,
            data,
            page: None,
        }
    }
}

/// Where a serialized response body came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadOrigin {
    Cache,
    Store,
}

/// Serialized JSON response body, exactly as cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    body: String,
    origin: PayloadOrigin,
}

impl Payload {
    pub fn render<T: Serialize>(envelope: &Envelope<'_, T>) -> Result<Self, serde_json::Error> {
        Ok(Self {
            body: serde_json::to_string(envelope)?,
            origin: PayloadOrigin::Store,
        })
    }

    pub fn cached(body: String) -> Self {
        Self {
            body,
            origin: PayloadOrigin::Cache,
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn origin(&self) -> PayloadOrigin {
        self.origin
    }

    pub fn into_body(self) -> String {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    #[test]
    fn list_envelope_flattens_page_meta() {
        let meta = PageMeta {
            count: 11,
            next: Some("/categories/?page=2".to_string()),
            previous: None,
        };
        let payload = Payload::render(&Envelope::page("listed", vec![1, 2], meta)).expect("json");
        let value: Value = serde_json::from_str(payload.body()).expect("parse");

        assert_eq!(
            value,
            json!({
                "success": true,
                "message": "listed",
                "data": [1, 2],
                "count": 11,
                "next": "/categories/?page=2",
                "previous": null,
            })
        );
        assert_eq!(payload.origin(), PayloadOrigin::Store);
    }

    #[test]
    fn failure_envelope_serializes_null_data() {
        let payload = Payload::render(&Envelope::<()>::failure("Category not found.", None))
            .expect("json");
        assert_eq!(
            payload.body(),
            r#"{"success":false,"message":"Category not found.","data":null}"#
        );
    }
}
