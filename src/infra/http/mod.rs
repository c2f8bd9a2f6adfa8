pub mod api;
mod middleware;

pub use api::{ApiState, build_api_router};

use std::sync::Arc;

use axum::{
    Router,
    extract::{FromRef, State},
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::application::{error::ErrorReport, repos::HealthRepo};
use crate::cache::CacheStore;

use self::middleware::{log_responses, set_request_context};

/// Dependencies checked by `GET /health`.
#[derive(Clone)]
pub struct HealthState {
    pub database: Arc<dyn HealthRepo>,
    pub cache: Arc<dyn CacheStore>,
}

#[derive(Clone)]
pub struct RouterState {
    pub health: HealthState,
    pub api: ApiState,
}

impl FromRef<RouterState> for HealthState {
    fn from_ref(state: &RouterState) -> Self {
        state.health.clone()
    }
}

impl FromRef<RouterState> for ApiState {
    fn from_ref(state: &RouterState) -> Self {
        state.api.clone()
    }
}

/// Full application router: resource API, health check and logging middleware.
pub fn build_router(state: RouterState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(build_api_router())
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

async fn health(State(state): State<HealthState>) -> Response {
    const SOURCE: &str = "infra::http::health";

    if let Err(err) = state.database.ping().await {
        return unavailable(ErrorReport::from_error(
            SOURCE,
            StatusCode::SERVICE_UNAVAILABLE,
            &err,
        ));
    }

    match state.cache.health_check().await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => unavailable(ErrorReport::from_message(
            SOURCE,
            StatusCode::SERVICE_UNAVAILABLE,
            format!("{} cache store reported unhealthy", state.cache.provider_name()),
        )),
        Err(err) => unavailable(ErrorReport::from_error(
            SOURCE,
            StatusCode::SERVICE_UNAVAILABLE,
            &err,
        )),
    }
}

fn unavailable(report: ErrorReport) -> Response {
    let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
    report.attach(&mut response);
    response
}
