use std::sync::Arc;

use axum::extract::{Extension, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use serde_json::Value;
use tierproxy_core::{dispatcher, ServerState};

use crate::middleware::TraceId;
use crate::response::{adapter_response_to_axum, proxy_error_to_axum};

pub async fn create_message(
    State(state): State<Arc<ServerState>>,
    Extension(trace_id): Extension<TraceId>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let anthropic_version = header_str(&headers, "anthropic-version");
    let anthropic_beta = header_str(&headers, "anthropic-beta");

    match dispatcher::dispatch_messages(&state, body, anthropic_version, anthropic_beta, &trace_id.0).await {
        Ok(response) => adapter_response_to_axum(response),
        Err(err) => proxy_error_to_axum(err),
    }
}

pub async fn count_tokens(
    State(state): State<Arc<ServerState>>,
    Extension(trace_id): Extension<TraceId>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let anthropic_version = header_str(&headers, "anthropic-version");
    let anthropic_beta = header_str(&headers, "anthropic-beta");

    match dispatcher::dispatch_count_tokens(&state, body, anthropic_version, anthropic_beta, &trace_id.0).await {
        Ok(response) => adapter_response_to_axum(response),
        Err(err) => proxy_error_to_axum(err),
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}
