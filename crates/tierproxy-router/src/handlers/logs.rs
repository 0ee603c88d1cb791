use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tierproxy_core::ServerState;

pub async fn list(State(state): State<Arc<ServerState>>) -> Response {
    let entries = state.logs.snapshot();
    (axum::http::StatusCode::OK, axum::Json(entries)).into_response()
}

pub async fn clear(State(state): State<Arc<ServerState>>) -> Response {
    state.logs.clear();
    (axum::http::StatusCode::OK, axum::Json(json!({ "cleared": true }))).into_response()
}
