use std::collections::HashMap;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;
use serde_json::Value;
use tierproxy_common::{BackendType, Tier};

use crate::error::AdapterError;

pub type BoxedByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// A fully classified, transformed request ready for a specific backend to
/// turn into an outbound HTTP call.
#[derive(Debug, Clone)]
pub struct OutboundMessagesRequest {
    /// Already thinking-stripped, reasoning-param-stripped, and (for the
    /// `custom` backend) whitelist-sanitized with `model` set to the
    /// outbound model name.
    pub body: Value,
    pub anthropic_version: Option<String>,
    /// Already filtered for the target backend's capabilities.
    pub anthropic_beta: Option<String>,
    /// The tier this request was classified into. Backends whose credentials
    /// are scoped per tier (GLM) use this to pick the right key/base URL.
    pub tier: Tier,
    pub stream: bool,
    pub timeout: Duration,
    pub trace_id: String,
}

#[derive(Debug)]
pub enum AdapterResponse {
    /// Raw upstream bytes; the dispatcher parses/post-filters only on a 2xx
    /// status and forwards non-2xx bodies verbatim.
    Buffered { status: u16, headers: HashMap<String, String>, body: Bytes },
    Streaming { status: u16, headers: HashMap<String, String>, body: BoxedByteStream },
}

/// One concrete upstream. Implementors build the outbound HTTP call (URL,
/// headers, auth) and forward it; the shared dispatcher in tierproxy-core
/// owns payload transformation, usage accounting and response shaping so
/// that logic is not duplicated per backend.
#[async_trait]
pub trait BackendAdapter: Send + Sync {
    fn backend_type(&self) -> BackendType;

    /// Whether this backend's SSE responses may contain stringified
    /// `tool_use.input` deltas that need repairing in flight.
    fn repairs_streaming_tool_calls(&self) -> bool {
        false
    }

    /// Applied to a successfully (2xx) buffered JSON response before it is
    /// returned to the client. Default is a no-op; the anthropic adapter
    /// strips thinking/redacted_thinking blocks.
    fn post_filter_response(&self, _body: &mut Value) {}

    async fn send_messages(&self, request: OutboundMessagesRequest) -> Result<AdapterResponse, AdapterError>;

    async fn send_count_tokens(
        &self,
        _request: OutboundMessagesRequest,
    ) -> Result<AdapterResponse, AdapterError> {
        Err(AdapterError::NotSupported)
    }
}
