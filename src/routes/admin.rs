use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::Value as JsonValue;
use validator::Validate;

use crate::dto::admin_dto::ListFilters;
use crate::dto::auth_dto::AdminLoginRequest;
use crate::error::{Error, Result};
use crate::services::admin_scope::RecordType;
use crate::services::admin_service::AdminActor;
use crate::AppState;

fn record_type(segment: &str) -> Result<RecordType> {
    segment.parse().map_err(Error::NotFound)
}

pub async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<Response> {
    payload.validate()?;
    let response = state
        .auth_service
        .admin_login(payload.username.trim(), &payload.password)
        .await?;
    Ok((StatusCode::OK, Json(response)).into_response())
}

pub async fn index(
    State(state): State<AppState>,
    Extension(actor): Extension<AdminActor>,
) -> Result<Response> {
    Ok(Json(state.admin_service.index(&actor)).into_response())
}

pub async fn list_records(
    State(state): State<AppState>,
    Extension(actor): Extension<AdminActor>,
    Path(record): Path<String>,
    Query(filters): Query<ListFilters>,
) -> Result<Response> {
    let record = record_type(&record)?;
    let records = state.admin_service.list(&actor, record, &filters).await?;
    Ok(Json(records).into_response())
}

pub async fn create_record(
    State(state): State<AppState>,
    Extension(actor): Extension<AdminActor>,
    Path(record): Path<String>,
    Json(payload): Json<JsonValue>,
) -> Result<Response> {
    let record = record_type(&record)?;
    let created = state.admin_service.create(&actor, record, payload).await?;
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

pub async fn view_record(
    State(state): State<AppState>,
    Extension(actor): Extension<AdminActor>,
    Path((record, id)): Path<(String, i64)>,
) -> Result<Response> {
    let record = record_type(&record)?;
    let found = state.admin_service.view(&actor, record, id).await?;
    Ok(Json(found).into_response())
}

pub async fn update_record(
    State(state): State<AppState>,
    Extension(actor): Extension<AdminActor>,
    Path((record, id)): Path<(String, i64)>,
    Json(payload): Json<JsonValue>,
) -> Result<Response> {
    let record = record_type(&record)?;
    let updated = state.admin_service.update(&actor, record, id, payload).await?;
    Ok(Json(updated).into_response())
}

pub async fn delete_record(
    State(state): State<AppState>,
    Extension(actor): Extension<AdminActor>,
    Path((record, id)): Path<(String, i64)>,
) -> Result<Response> {
    let record = record_type(&record)?;
    state.admin_service.delete(&actor, record, id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
