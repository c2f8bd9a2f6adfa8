use axum::{
    Json,
    extract::{Path, RawQuery, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::application::products::{CREATED, NOT_FOUND, UPDATED};
use crate::cache::QueryParams;
use crate::infra::http::api::{
    error::ApiError,
    models::ProductRequest,
    response::{envelope_response, payload_response},
    state::ApiState,
};

use super::parse_id;

pub async fn list_products(
    State(state): State<ApiState>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    let params = QueryParams::parse(query.as_deref());
    let payload = state.products.list(&params).await?;
    Ok(payload_response(payload))
}

pub async fn get_product(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, NOT_FOUND)?;
    let payload = state.products.retrieve(id).await?;
    Ok(payload_response(payload))
}

pub async fn create_product(
    State(state): State<ApiState>,
    body: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body?;
    let product = state.products.create(request.into()).await?;
    Ok(envelope_response(StatusCode::CREATED, CREATED, product))
}

pub async fn update_product(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    body: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, NOT_FOUND)?;
    let Json(request) = body?;
    let product = state.products.update(id, request.into()).await?;
    Ok(envelope_response(StatusCode::OK, UPDATED, product))
}

pub async fn delete_product(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, NOT_FOUND)?;
    state.products.delete(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
