use async_trait::async_trait;
use tierproxy_common::BackendType;
use tierproxy_provider_core::{AdapterError, AdapterResponse, BackendAdapter, OutboundMessagesRequest};

use crate::common::{into_adapter_response, map_transport_error};

/// Local proxy in front of an IDE-account Copilot-style service; it owns its
/// own auth, so the outbound call carries a fixed dummy bearer token.
pub struct CopilotBridgeAdapter {
    base_url: String,
    http: wreq::Client,
}

impl CopilotBridgeAdapter {
    pub fn new(base_url: String) -> Self {
        Self { base_url, http: crate::http_client::shared_client() }
    }
}

#[async_trait]
impl BackendAdapter for CopilotBridgeAdapter {
    fn backend_type(&self) -> BackendType {
        BackendType::CopilotBridge
    }

    async fn send_messages(&self, request: OutboundMessagesRequest) -> Result<AdapterResponse, AdapterError> {
        let mut builder = self
            .http
            .post(format!("{}/v1/messages", self.base_url.trim_end_matches('/')))
            .timeout(request.timeout)
            .header("content-type", "application/json")
            .header("authorization", "Bearer dummy");

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

        into_adapter_response(response, request.stream, false).await
    }
}
