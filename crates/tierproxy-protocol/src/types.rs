use serde::Serialize;

/// Content block types that carry extended-thinking output and get stripped
/// from requests bound for backends that don't accept them back.
pub const THINKING_BLOCK_TYPES: [&str; 2] = ["thinking", "redacted_thinking"];

/// Structured error envelope matching Anthropic's own error shape, so existing
/// SDK clients parse locally-surfaced errors without special casing.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    #[serde(rename = "type")]
    pub envelope_type: &'static str,
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub error_type: &'static str,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn new(error_type: &'static str, message: impl Into<String>) -> Self {
        Self {
            envelope_type: "error",
            error: ErrorBody {
                error_type,
                message: message.into(),
            },
        }
    }
}
