use async_trait::async_trait;
use tierproxy_common::BackendType;
use tierproxy_provider_core::{AdapterError, AdapterResponse, BackendAdapter, OutboundMessagesRequest};

use crate::common::{into_adapter_response, map_transport_error};

/// Generic Anthropic-compatible backend. The dispatcher has already run the
/// body through the deep whitelist sanitizer (§4.2 step 4) before it reaches
/// this adapter; streamed tool-call deltas still need SSE repair since the
/// sanitizer cannot fix bytes it hasn't received yet.
pub struct CustomAdapter {
    base_url: String,
    api_key: String,
    http: wreq::Client,
}

impl CustomAdapter {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self { base_url, api_key, http: crate::http_client::shared_client() }
    }
}

#[async_trait]
impl BackendAdapter for CustomAdapter {
    fn backend_type(&self) -> BackendType {
        BackendType::Custom
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
            .header("x-api-key", &self.api_key);

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
            .map_err(|err| map_transport_error(err, None))?;

        into_adapter_response(response, request.stream, self.repairs_streaming_tool_calls()).await
    }
}
