use serde::{Deserialize, Serialize};
use std::fmt;

/// The three qualitative size/latency tiers a request is classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Haiku,
    Sonnet,
    Opus,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Haiku, Tier::Sonnet, Tier::Opus];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Haiku => "haiku",
            Tier::Sonnet => "sonnet",
            Tier::Opus => "opus",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One concrete upstream the proxy can forward a classified request to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendType {
    Anthropic,
    Glm,
    GeminiBridge,
    CopilotBridge,
    Openrouter,
    Custom,
}

impl BackendType {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendType::Anthropic => "anthropic",
            BackendType::Glm => "glm",
            BackendType::GeminiBridge => "gemini_bridge",
            BackendType::CopilotBridge => "copilot_bridge",
            BackendType::Openrouter => "openrouter",
            BackendType::Custom => "custom",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "anthropic" => Some(BackendType::Anthropic),
            "glm" | "zai" => Some(BackendType::Glm),
            "gemini_bridge" | "antigravity" => Some(BackendType::GeminiBridge),
            "copilot_bridge" | "copilot" => Some(BackendType::CopilotBridge),
            "openrouter" => Some(BackendType::Openrouter),
            "custom" => Some(BackendType::Custom),
            _ => None,
        }
    }

    /// Whether this backend understands Anthropic's `thinking`/`effort` reasoning
    /// parameters for the given outbound model name.
    pub fn is_reasoning_capable(self, outbound_model: &str) -> bool {
        const REASONING_MODELS: [&str; 4] =
            ["sonnet-3-7", "sonnet-4-5", "opus-4-5", "claude-3-7"];
        self == BackendType::Anthropic
            && REASONING_MODELS.iter().any(|needle| outbound_model.contains(needle))
    }
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
