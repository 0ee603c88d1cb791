pub mod anthropic;
pub mod common;
pub mod copilot_bridge;
pub mod credential;
pub mod custom;
pub mod gemini_bridge;
pub mod glm;
pub mod http_client;
pub mod openrouter;

pub use anthropic::AnthropicAdapter;
pub use copilot_bridge::CopilotBridgeAdapter;
pub use credential::CredentialManager;
pub use custom::CustomAdapter;
pub use gemini_bridge::GeminiBridgeAdapter;
pub use glm::GlmAdapter;
pub use openrouter::OpenrouterAdapter;
