use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tierproxy_core::auth;
use tierproxy_core::{ProxyError, ServerState};
use tierproxy_protocol::ErrorEnvelope;

/// Request-scoped trace id, generated here and read back by handlers that
/// want to correlate their `tracing` spans with the one this layer opens.
#[derive(Debug, Clone)]
pub struct TraceId(pub String);

pub async fn auth_middleware(
    State(state): State<Arc<ServerState>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let trace_id = uuid::Uuid::new_v4().to_string();
    let path = req.uri().path().to_string();

    let span = tracing::info_span!("request", trace_id = %trace_id, path = %path, method = %req.method());
    let _entered = span.enter();

    if !auth::BYPASS_PATHS.contains(&path.as_str()) {
        let query_key = req.uri().query().and_then(extract_query_key);
        if !auth::authorized(state.global.proxy_api_key.as_deref(), query_key.as_deref(), req.headers()) {
            let err = ProxyError::Authentication("missing or invalid proxy api key".to_string());
            return unauthorized(err.envelope());
        }
    }

    req.extensions_mut().insert(TraceId(trace_id.clone()));
    drop(_entered);

    let mut resp = next.run(req).await;
    resp.headers_mut().insert(
        "x-tierproxy-request-id",
        trace_id.parse().unwrap_or_else(|_| "invalid".parse().unwrap()),
    );
    resp
}

fn extract_query_key(query: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == "key")
        .map(|(_, v)| v.to_string())
}

fn unauthorized(envelope: ErrorEnvelope) -> Response {
    (StatusCode::UNAUTHORIZED, axum::Json(envelope)).into_response()
}
