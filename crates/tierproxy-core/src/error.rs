use tierproxy_protocol::ErrorEnvelope;
use tierproxy_provider_core::AdapterError;

use crate::router::Misconfigured;

/// The locally-surfaced error taxonomy (§7). Every variant here is rendered
/// through the Anthropic error envelope shape so existing SDK clients parse
/// it without special casing; `UpstreamError` instead forwards the
/// upstream's own body and status verbatim and never reaches this type.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("authentication error: {0}")]
    Authentication(String),
    #[error("upstream request timed out{}", .0.as_ref().map(|h| format!(": {h}")).unwrap_or_default())]
    UpstreamTimeout(Option<String>),
    #[error("internal error: {0}")]
    Internal(String),
    #[error("not supported: {0}")]
    NotSupported(String),
}

impl ProxyError {
    pub fn status(&self) -> u16 {
        match self {
            ProxyError::Configuration(_) => 503,
            ProxyError::Authentication(_) => 401,
            ProxyError::UpstreamTimeout(_) => 504,
            ProxyError::Internal(_) => 500,
            ProxyError::NotSupported(_) => 501,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ProxyError::Configuration(_) => "configuration_error",
            ProxyError::Authentication(_) => "authentication_error",
            ProxyError::UpstreamTimeout(_) => "upstream_timeout",
            ProxyError::Internal(_) => "internal_error",
            ProxyError::NotSupported(_) => "not_supported",
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope::new(self.error_type(), self.to_string())
    }
}

impl From<Misconfigured> for ProxyError {
    fn from(err: Misconfigured) -> Self {
        ProxyError::Configuration(format!(
            "tier {} is routed to backend {} but its prerequisites are not met",
            err.tier, err.backend
        ))
    }
}

impl From<AdapterError> for ProxyError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::Timeout { hint } => ProxyError::UpstreamTimeout(hint),
            AdapterError::Internal(message) => ProxyError::Internal(message),
            AdapterError::NotSupported => {
                ProxyError::NotSupported("not supported by this backend".to_string())
            }
        }
    }
}
