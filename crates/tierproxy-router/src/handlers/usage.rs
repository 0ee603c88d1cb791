use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use tierproxy_core::ServerState;

use super::internal_error;

pub async fn stats(State(state): State<Arc<ServerState>>) -> Response {
    let snapshot = state.usage.snapshot();
    (axum::http::StatusCode::OK, axum::Json(snapshot)).into_response()
}

pub async fn reset(State(state): State<Arc<ServerState>>) -> Response {
    match state.usage.reset().await {
        Ok(()) => {
            let snapshot = state.usage.snapshot();
            (axum::http::StatusCode::OK, axum::Json(snapshot)).into_response()
        }
        Err(err) => internal_error(err.to_string()),
    }
}
