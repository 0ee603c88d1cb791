use async_trait::async_trait;
use tierproxy_common::config::TierCredMap;
use tierproxy_common::BackendType;
use tierproxy_provider_core::{AdapterError, AdapterResponse, BackendAdapter, OutboundMessagesRequest};

use crate::common::{into_adapter_response, map_transport_error};

/// GLM/Z.AI-style Anthropic-compatible backend: API key and base URL are
/// scoped per tier (each tier can point at a different GLM account or
/// endpoint), so unlike the other adapters this one holds the whole
/// `TierCredMap` rather than a single credential pair.
pub struct GlmAdapter {
    creds: TierCredMap,
    http: wreq::Client,
}

impl GlmAdapter {
    pub fn new(creds: TierCredMap) -> Self {
        Self { creds, http: crate::http_client::shared_client() }
    }
}

#[async_trait]
impl BackendAdapter for GlmAdapter {
    fn backend_type(&self) -> BackendType {
        BackendType::Glm
    }

    async fn send_messages(&self, request: OutboundMessagesRequest) -> Result<AdapterResponse, AdapterError> {
        let cred = self
            .creds
            .get(request.tier)
            .ok_or_else(|| AdapterError::internal(format!("no glm credential configured for {} tier", request.tier)))?;

        let mut builder = self
            .http
            .post(format!("{}/v1/messages", cred.base_url.trim_end_matches('/')))
            .timeout(request.timeout)
            .header("content-type", "application/json")
            .header("x-api-key", &cred.api_key);

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
