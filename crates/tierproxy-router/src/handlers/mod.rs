pub mod config;
pub mod favorites;
pub mod health;
pub mod logs;
pub mod messages;
pub mod usage;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tierproxy_protocol::ErrorEnvelope;

pub fn bad_request(message: impl Into<String>) -> Response {
    let envelope = ErrorEnvelope::new("invalid_request_error", message);
    (StatusCode::BAD_REQUEST, axum::Json(envelope)).into_response()
}

pub fn internal_error(message: impl Into<String>) -> Response {
    let envelope = ErrorEnvelope::new("internal_error", message);
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(envelope)).into_response()
}
