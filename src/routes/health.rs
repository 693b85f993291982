use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::config::StorageBackend;
use crate::AppState;

#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let storage = match state.config.storage_backend {
        StorageBackend::Postgres => "postgres",
        StorageBackend::Memory => "memory",
    };
    let body = json!({
        "status": "ok",
        "storage": storage,
    });
    (StatusCode::OK, Json(body))
}
