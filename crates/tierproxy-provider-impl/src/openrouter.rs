use async_trait::async_trait;
use tierproxy_common::BackendType;
use tierproxy_provider_core::{AdapterError, AdapterResponse, BackendAdapter, OutboundMessagesRequest};

use crate::common::{into_adapter_response, map_transport_error};

const REFERER: &str = "https://tierproxy.leenhawk.com";
const TITLE: &str = "tierproxy";

/// OpenRouter's Anthropic-compatible aggregator endpoint. Requires the two
/// attribution headers OpenRouter uses for per-app rate limiting.
pub struct OpenrouterAdapter {
    base_url: String,
    api_key: String,
    http: wreq::Client,
}

impl OpenrouterAdapter {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self { base_url, api_key, http: crate::http_client::shared_client() }
    }
}

#[async_trait]
impl BackendAdapter for OpenrouterAdapter {
    fn backend_type(&self) -> BackendType {
        BackendType::Openrouter
    }

    async fn send_messages(&self, request: OutboundMessagesRequest) -> Result<AdapterResponse, AdapterError> {
        let mut builder = self
            .http
            .post(format!("{}/v1/messages", self.base_url.trim_end_matches('/')))
            .timeout(request.timeout)
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", self.api_key))
            .header("http-referer", REFERER)
            .header("x-title", TITLE);

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
