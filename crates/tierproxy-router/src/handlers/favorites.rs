use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tierproxy_core::ServerState;

use super::internal_error;

pub async fn list(State(state): State<Arc<ServerState>>) -> Response {
    let entries = state.favorites.list();
    (axum::http::StatusCode::OK, axum::Json(entries)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct AddFavoriteRequest {
    pub name: String,
}

pub async fn add(State(state): State<Arc<ServerState>>, Json(req): Json<AddFavoriteRequest>) -> Response {
    let config = state.config_store.snapshot();
    match state.favorites.add(req.name, config).await {
        Ok(entry) => (axum::http::StatusCode::CREATED, axum::Json(entry)).into_response(),
        Err(err) => internal_error(err.to_string()),
    }
}

pub async fn remove(State(state): State<Arc<ServerState>>, Path(index): Path<usize>) -> Response {
    match state.favorites.remove(index).await {
        Ok(true) => (axum::http::StatusCode::OK, axum::Json(json!({ "removed": true }))).into_response(),
        Ok(false) => (axum::http::StatusCode::NOT_FOUND, axum::Json(json!({ "removed": false }))).into_response(),
        Err(err) => internal_error(err.to_string()),
    }
}
