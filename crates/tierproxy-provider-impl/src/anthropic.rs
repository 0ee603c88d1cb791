use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tierproxy_common::BackendType;
use tierproxy_provider_core::{AdapterError, AdapterResponse, BackendAdapter, OutboundMessagesRequest};
use tierproxy_transform::strip_thinking_blocks_from_response;

use crate::common::{into_adapter_response, map_transport_error};
use crate::credential::CredentialManager;

const DEFAULT_ANTHROPIC_VERSION: &str = "2023-06-01";

/// Native Anthropic: bearer token from the OAuth credential manager, beta
/// header forwarded verbatim, thinking blocks stripped from the response
/// before it reaches the client.
pub struct AnthropicAdapter {
    base_url: String,
    credentials: Arc<CredentialManager>,
    http: wreq::Client,
}

impl AnthropicAdapter {
    pub fn new(base_url: String, credentials: Arc<CredentialManager>) -> Self {
        Self { base_url, credentials, http: crate::http_client::shared_client() }
    }

    async fn call(&self, endpoint: &str, request: &OutboundMessagesRequest) -> Result<wreq::Response, AdapterError> {
        let token = self.credentials.current_access_token().await;

        let mut builder = self
            .http
            .post(format!("{}/v1/{endpoint}", self.base_url.trim_end_matches('/')))
            .timeout(request.timeout)
            .header("content-type", "application/json")
            .header(
                "anthropic-version",
                request.anthropic_version.as_deref().unwrap_or(DEFAULT_ANTHROPIC_VERSION),
            );

        if let Some(beta) = request.anthropic_beta.as_deref() {
            builder = builder.header("anthropic-beta", beta);
        }
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }

        builder
            .json(&request.body)
            .send()
            .await
            .map_err(|err| map_transport_error(err, None))
    }
}

#[async_trait]
impl BackendAdapter for AnthropicAdapter {
    fn backend_type(&self) -> BackendType {
        BackendType::Anthropic
    }

    fn post_filter_response(&self, body: &mut Value) {
        strip_thinking_blocks_from_response(body);
    }

    async fn send_messages(&self, request: OutboundMessagesRequest) -> Result<AdapterResponse, AdapterError> {
        let stream = request.stream;
        let response = self.call("messages", &request).await?;
        into_adapter_response(response, stream, false).await
    }

    async fn send_count_tokens(&self, request: OutboundMessagesRequest) -> Result<AdapterResponse, AdapterError> {
        let response = self.call("messages/count_tokens", &request).await?;
        into_adapter_response(response, false, false).await
    }
}
