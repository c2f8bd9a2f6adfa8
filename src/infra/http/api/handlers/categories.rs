use axum::{
    Json,
    extract::{Path, RawQuery, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::application::categories::{CREATED, NOT_FOUND, UPDATED};
use crate::cache::QueryParams;
use crate::infra::http::api::{
    error::ApiError,
    models::CategoryRequest,
    response::{envelope_response, payload_response},
    state::ApiState,
};

use super::parse_id;

pub async fn list_categories(
    State(state): State<ApiState>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    let params = QueryParams::parse(query.as_deref());
    let payload = state.categories.list(&params).await?;
    Ok(payload_response(payload))
}

pub async fn get_category(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, NOT_FOUND)?;
    let payload = state.categories.retrieve(id).await?;
    Ok(payload_response(payload))
}

pub async fn create_category(
    State(state): State<ApiState>,
    body: Result<Json<CategoryRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body?;
    let category = state.categories.create(request.into()).await?;
    Ok(envelope_response(StatusCode::CREATED, CREATED, category))
}

pub async fn update_category(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    body: Result<Json<CategoryRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, NOT_FOUND)?;
    let Json(request) = body?;
    let category = state.categories.update(id, request.into()).await?;
    Ok(envelope_response(StatusCode::OK, UPDATED, category))
}

pub async fn delete_category(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, NOT_FOUND)?;
    state.categories.delete(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
