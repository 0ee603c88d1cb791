use std::time::Duration;

use bytes::Bytes;
use serde_json::Value;
use tierproxy_common::BackendType;
use tierproxy_provider_core::{AdapterResponse, BackendAdapter, OutboundMessagesRequest};

use crate::error::ProxyError;
use crate::router::{self, RouteDecision};
use crate::state::ServerState;

const DEFAULT_INCOMING_MODEL: &str = "claude-3-5-haiku-20241022";

/// Top-level pipeline for `POST /v1/messages`: classify, transform, forward,
/// shape the response. The caller (tierproxy-router) has already run
/// authentication and handed over a parsed body plus the two inbound
/// headers the transformer cares about.
pub async fn dispatch_messages(
    state: &ServerState,
    mut body: Value,
    anthropic_version: Option<String>,
    anthropic_beta_header: Option<String>,
    trace_id: &str,
) -> Result<AdapterResponse, ProxyError> {
    let incoming_model =
        body.get("model").and_then(Value::as_str).unwrap_or(DEFAULT_INCOMING_MODEL).to_string();
    let stream_requested = body.get("stream").and_then(Value::as_bool).unwrap_or(false);

    let decision = classify_and_select(state, &incoming_model)?;
    tracing::info!(
        trace_id,
        tier = %decision.tier,
        backend = %decision.backend,
        model = %decision.outbound_model,
        "routing request"
    );

    let beta = transform_request(&mut body, &decision, anthropic_beta_header.as_deref());
    body["model"] = Value::String(decision.outbound_model.clone());

    let adapter = state
        .adapter_for(decision.backend)
        .ok_or_else(|| ProxyError::Configuration(format!("no adapter wired for backend {}", decision.backend)))?;

    let request = OutboundMessagesRequest {
        body,
        anthropic_version,
        anthropic_beta: beta,
        tier: decision.tier,
        stream: stream_requested,
        timeout: Duration::from_secs(state.global.request_timeout_secs),
        trace_id: trace_id.to_string(),
    };

    let response = adapter.send_messages(request).await?;
    Ok(finalize_response(state, response, adapter.as_ref(), &decision).await)
}

/// `POST /v1/messages/count_tokens`: only meaningful against the native
/// Anthropic backend; any other target is `not_supported` (501).
pub async fn dispatch_count_tokens(
    state: &ServerState,
    mut body: Value,
    anthropic_version: Option<String>,
    anthropic_beta_header: Option<String>,
    trace_id: &str,
) -> Result<AdapterResponse, ProxyError> {
    let incoming_model =
        body.get("model").and_then(Value::as_str).unwrap_or(DEFAULT_INCOMING_MODEL).to_string();
    let decision = classify_and_select(state, &incoming_model)?;

    if decision.backend != BackendType::Anthropic {
        return Err(ProxyError::NotSupported(
            "count_tokens is only forwarded to the native anthropic backend".to_string(),
        ));
    }

    let beta = transform_request(&mut body, &decision, anthropic_beta_header.as_deref());
    body["model"] = Value::String(decision.outbound_model.clone());

    let adapter = state
        .adapter_for(decision.backend)
        .ok_or_else(|| ProxyError::Configuration(format!("no adapter wired for backend {}", decision.backend)))?;

    let request = OutboundMessagesRequest {
        body,
        anthropic_version,
        anthropic_beta: beta,
        tier: decision.tier,
        stream: false,
        timeout: Duration::from_secs(state.global.request_timeout_secs),
        trace_id: trace_id.to_string(),
    };

    Ok(adapter.send_count_tokens(request).await?)
}

fn classify_and_select(state: &ServerState, incoming_model: &str) -> Result<RouteDecision, ProxyError> {
    let runtime_config = state.config_store.snapshot();
    let tier = router::classify_tier(incoming_model, &runtime_config);
    router::select_backend(tier, &runtime_config, &state.availability, incoming_model).map_err(ProxyError::from)
}

/// Applies the payload transformer pipeline in spec order (§4.2 steps 1-4)
/// and returns the filtered `anthropic-beta` header value, if any.
fn transform_request(
    body: &mut Value,
    decision: &RouteDecision,
    anthropic_beta_header: Option<&str>,
) -> Option<String> {
    let removed = tierproxy_transform::strip_thinking_blocks(body);
    if removed > 0 {
        tracing::debug!(removed, "stripped thinking blocks from outbound request");
    }

    tierproxy_transform::strip_reasoning_params(body, decision.backend, &decision.outbound_model);

    let reasoning_capable = decision.backend.is_reasoning_capable(&decision.outbound_model);
    let beta = anthropic_beta_header
        .and_then(|raw| tierproxy_transform::filter_beta_header(raw, decision.backend, reasoning_capable));

    if decision.backend == BackendType::Custom {
        *body = tierproxy_transform::sanitize(body);
    }

    beta
}

/// Applies the adapter's response post-filter (thinking-block strip for
/// native Anthropic) and records usage, for a successful buffered response.
/// Streaming responses and non-2xx buffered responses pass through
/// untouched — usage is only ever recorded from a parsed JSON body.
async fn finalize_response(
    state: &ServerState,
    response: AdapterResponse,
    adapter: &dyn BackendAdapter,
    decision: &RouteDecision,
) -> AdapterResponse {
    let AdapterResponse::Buffered { status, headers, body } = response else {
        return response;
    };
    if !(200..300).contains(&status) {
        return AdapterResponse::Buffered { status, headers, body };
    }

    let Ok(mut json) = serde_json::from_slice::<Value>(&body) else {
        return AdapterResponse::Buffered { status, headers, body };
    };

    adapter.post_filter_response(&mut json);
    record_usage(state, &json, decision).await;

    let rewritten = serde_json::to_vec(&json).unwrap_or_else(|_| body.to_vec());
    AdapterResponse::Buffered { status, headers, body: Bytes::from(rewritten) }
}

async fn record_usage(state: &ServerState, body: &Value, decision: &RouteDecision) {
    let Some(usage) = body.get("usage") else {
        return;
    };
    let input_tokens = usage.get("input_tokens").and_then(Value::as_u64).unwrap_or(0);
    let output_tokens = usage.get("output_tokens").and_then(Value::as_u64).unwrap_or(0);
    state
        .usage
        .record(decision.backend.as_str(), &decision.outbound_model, decision.tier.as_str(), input_tokens, output_tokens)
        .await;
}

