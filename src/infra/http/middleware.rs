use std::time::Instant;

use axum::{
    body::Body,
    http::{Request, Response as HttpResponse},
    middleware::Next,
    response::Response,
};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;
use crate::cache::{CATEGORIES_NAMESPACE, PRODUCTS_NAMESPACE};

use super::api::response::CACHE_STATUS_HEADER;

/// Per-request identity shared by the handlers and the response logger.
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub request_id: String,
    /// Cache namespace owning the requested path, if any.
    pub namespace: Option<&'static str>,
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let ctx = RequestContext {
        request_id: Uuid::new_v4().to_string(),
        namespace: namespace_for_path(request.uri().path()),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

fn namespace_for_path(path: &str) -> Option<&'static str> {
    match path.trim_start_matches('/').split('/').next() {
        Some(segment) if segment == CATEGORIES_NAMESPACE => Some(CATEGORIES_NAMESPACE),
        Some(segment) if segment == PRODUCTS_NAMESPACE => Some(PRODUCTS_NAMESPACE),
        _ => None,
    }
}

/// `HIT`/`MISS` for cached reads, `-` for writes and errors.
fn cache_origin<B>(response: &HttpResponse<B>) -> &str {
    response
        .headers()
        .get(CACHE_STATUS_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
}

pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let (request_id, namespace) = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| (ctx.request_id.clone(), ctx.namespace))
        .unwrap_or_default();
    let namespace = namespace.unwrap_or("-");

    let mut response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis();

    if !(status.is_client_error() || status.is_server_error()) {
        debug!(
            target = "catalog::http::response",
            status = status.as_u16(),
            method = %method,
            path = %uri.path(),
            namespace,
            cache = cache_origin(&response),
            elapsed_ms,
            request_id,
            "request served",
        );
        return response;
    }

    let report = response.extensions_mut().remove::<ErrorReport>();
    let (source, messages) = match report {
        Some(report) => (report.source, report.messages),
        None => ("unknown", Vec::new()),
    };
    let detail = messages
        .first()
        .cloned()
        .unwrap_or_else(|| "no diagnostic available".to_string());

    if status.is_server_error() {
        error!(
            target = "catalog::http::response",
            status = status.as_u16(),
            method = %method,
            path = %uri.path(),
            query = uri.query().unwrap_or(""),
            namespace,
            elapsed_ms,
            source,
            detail = %detail,
            chain = ?messages,
            request_id,
            "catalog request failed",
        );
    } else {
        warn!(
            target = "catalog::http::response",
            status = status.as_u16(),
            method = %method,
            path = %uri.path(),
            query = uri.query().unwrap_or(""),
            namespace,
            elapsed_ms,
            source,
            detail = %detail,
            request_id,
            "catalog request rejected",
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension, Router,
        http::{HeaderValue, StatusCode},
        middleware::from_fn,
        routing::get,
    };
    use tower::ServiceExt;

    use super::*;

    async fn echo_namespace(Extension(ctx): Extension<RequestContext>) -> String {
        ctx.namespace.unwrap_or("none").to_string()
    }

    #[test]
    fn namespace_follows_first_path_segment() {
        assert_eq!(namespace_for_path("/categories/"), Some(CATEGORIES_NAMESPACE));
        assert_eq!(namespace_for_path("/categories/7/"), Some(CATEGORIES_NAMESPACE));
        assert_eq!(namespace_for_path("/products/12"), Some(PRODUCTS_NAMESPACE));
        assert_eq!(namespace_for_path("/health"), None);
        assert_eq!(namespace_for_path("/productsx/"), None);
        assert_eq!(namespace_for_path("/"), None);
    }

    #[test]
    fn cache_origin_reads_header_or_dash() {
        let mut response = HttpResponse::new(());
        assert_eq!(cache_origin(&response), "-");

        response
            .headers_mut()
            .insert(CACHE_STATUS_HEADER, HeaderValue::from_static("HIT"));
        assert_eq!(cache_origin(&response), "HIT");
    }

    #[tokio::test]
    async fn request_context_reaches_handler_and_response() {
        let router = Router::new()
            .route("/products/{id}", get(echo_namespace))
            .layer(from_fn(log_responses))
            .layer(from_fn(set_request_context));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/products/3")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let ctx = response
            .extensions()
            .get::<RequestContext>()
            .cloned()
            .expect("request context on response");
        assert_eq!(ctx.namespace, Some(PRODUCTS_NAMESPACE));
        assert!(Uuid::parse_str(&ctx.request_id).is_ok());

        let body = http_body_util::BodyExt::collect(response.into_body())
            .await
            .expect("body")
            .to_bytes();
        assert_eq!(&body[..], b"products");
    }
}
