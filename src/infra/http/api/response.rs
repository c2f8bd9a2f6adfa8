use axum::{
    Json,
    http::{HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::application::envelope::{Envelope, Payload, PayloadOrigin};

pub const CACHE_STATUS_HEADER: HeaderName = HeaderName::from_static("x-cache");

/// 200 response carrying a serialized envelope as-is.
pub fn payload_response(payload: Payload) -> Response {
    let cache_status = match payload.origin() {
        PayloadOrigin::Cache => HeaderValue::from_static("HIT"),
        PayloadOrigin::Store => HeaderValue::from_static("MISS"),
    };

    (
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            ),
            (CACHE_STATUS_HEADER, cache_status),
        ],
        payload.into_body(),
    )
        .into_response()
}

pub fn envelope_response<T: Serialize>(status: StatusCode, message: &str, data: T) -> Response {
    (status, Json(Envelope::ok(message, data))).into_response()
}
