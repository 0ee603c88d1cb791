use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use futures_util::StreamExt;
use tierproxy_core::ProxyError;
use tierproxy_provider_core::AdapterResponse;

/// Converts a backend adapter's response into the axum response sent to the
/// downstream client. Buffered bodies go out as-is; streaming bodies keep
/// their `event-stream` framing and are never buffered in memory.
pub fn adapter_response_to_axum(response: AdapterResponse) -> Response {
    match response {
        AdapterResponse::Buffered { status, headers, body } => {
            let mut builder = Response::builder().status(status_from_u16(status));
            if let Some(map) = builder.headers_mut() {
                apply_headers(map, &headers);
            }
            builder.body(Body::from(body)).unwrap_or_else(|_| response_build_failed())
        }
        AdapterResponse::Streaming { status, headers, body } => {
            let mut builder = Response::builder().status(status_from_u16(status));
            if let Some(map) = builder.headers_mut() {
                apply_headers(map, &headers);
                map.entry(header::CONTENT_TYPE)
                    .or_insert(HeaderValue::from_static("text/event-stream"));
                map.entry(header::CACHE_CONTROL).or_insert(HeaderValue::from_static("no-cache"));
            }
            let stream = body.map(|chunk| chunk.map_err(std::io::Error::from));
            builder.body(Body::from_stream(stream)).unwrap_or_else(|_| response_build_failed())
        }
    }
}

pub fn proxy_error_to_axum(err: ProxyError) -> Response {
    tracing::warn!(error = %err, status = err.status(), "request failed");
    let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, axum::Json(err.envelope())).into_response()
}

fn status_from_u16(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
}

fn apply_headers(map: &mut axum::http::HeaderMap, headers: &std::collections::HashMap<String, String>) {
    for (name, value) in headers {
        if let (Ok(name), Ok(value)) =
            (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value))
        {
            map.append(name, value);
        }
    }
}

fn response_build_failed() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "response_build_failed").into_response()
}
