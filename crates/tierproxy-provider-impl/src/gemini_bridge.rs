use async_trait::async_trait;
use tierproxy_common::BackendType;
use tierproxy_provider_core::{AdapterError, AdapterResponse, BackendAdapter, OutboundMessagesRequest};

use crate::common::{into_adapter_response, map_transport_error};

const READ_TIMEOUT_HINT: &str =
    "the gemini bridge helper did not respond in time; its upstream session may need re-authentication";

/// Local subprocess helper exposing an Anthropic-compatible interface in
/// front of a Gemini-family model. Auth is internal to the helper, so the
/// proxy sends a fixed placeholder key; streamed tool-call deltas need SSE
/// repair because the helper sometimes emits stringified `input`.
pub struct GeminiBridgeAdapter {
    base_url: String,
    http: wreq::Client,
}

impl GeminiBridgeAdapter {
    pub fn new(base_url: String) -> Self {
        Self { base_url, http: crate::http_client::shared_client() }
    }
}

#[async_trait]
impl BackendAdapter for GeminiBridgeAdapter {
    fn backend_type(&self) -> BackendType {
        BackendType::GeminiBridge
    }

    fn repairs_streaming_tool_calls(&self) -> bool {
        true
    }

    async fn send_messages(&self, request: OutboundMessagesRequest) -> Result<AdapterResponse, AdapterError> {
        let mut builder = self
            .http
            .post(format!("{}/v1/messages", self.base_url.trim_end_matches('/')))
            .timeout(request.timeout)
            .header("content-type", "application/json")
            .header("x-api-key", "test");

        if let Some(version) = request.anthropic_version.as_deref() {
            builder = builder.header("anthropic-version", version);
        }
        if let Some(beta) = request.anthropic_beta.as_deref() {
            builder = builder.header("anthropic-beta", beta);
        }

        let response = builder
            .json(&request.body)
            .send()
            .await
            .map_err(|err| map_transport_error(err, Some(READ_TIMEOUT_HINT)))?;

        into_adapter_response(response, request.stream, self.repairs_streaming_tool_calls()).await
    }
}
