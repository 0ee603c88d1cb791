use std::collections::HashMap;
use std::path::PathBuf;

use crate::domain::{BackendType, Tier};

/// Static process configuration resolved once at startup from CLI flags and
/// environment variables. Unlike `RuntimeConfig` (tierproxy-storage) this
/// never changes for the lifetime of the process and is never persisted.
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    pub host: String,
    pub port: u16,
    pub proxy_api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub data_dir: PathBuf,
    pub log_file: Option<PathBuf>,

    pub anthropic_base_url: String,
    pub anthropic_models: TierMap,

    pub glm_creds: TierCredMap,
    pub glm_models: TierMap,

    pub gemini_bridge_enabled: bool,
    pub gemini_bridge_port: u16,
    pub gemini_bridge_config_dir: Option<PathBuf>,
    pub gemini_bridge_models: TierMap,

    pub copilot_enabled: bool,
    pub copilot_base_url: String,
    pub copilot_models: TierMap,

    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub openrouter_models: TierMap,

    pub custom_api_key: Option<String>,
    pub custom_base_url: Option<String>,
    pub custom_models: TierMap,

    /// Initial per-tier backend choice, used only to seed `config.json` the
    /// first time the process runs against an empty data directory.
    pub default_providers: HashMap<Tier, BackendType>,
}

/// A value per tier, e.g. the model name a backend should use for haiku
/// requests, sonnet requests and opus requests.
#[derive(Debug, Clone, Default)]
pub struct TierMap {
    pub haiku: Option<String>,
    pub sonnet: Option<String>,
    pub opus: Option<String>,
}

impl TierMap {
    pub fn get(&self, tier: Tier) -> Option<&str> {
        match tier {
            Tier::Haiku => self.haiku.as_deref(),
            Tier::Sonnet => self.sonnet.as_deref(),
            Tier::Opus => self.opus.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TierCredMap {
    pub haiku: Option<TierCred>,
    pub sonnet: Option<TierCred>,
    pub opus: Option<TierCred>,
}

#[derive(Debug, Clone)]
pub struct TierCred {
    pub api_key: String,
    pub base_url: String,
}

impl TierCredMap {
    pub fn get(&self, tier: Tier) -> Option<&TierCred> {
        match tier {
            Tier::Haiku => self.haiku.as_ref(),
            Tier::Sonnet => self.sonnet.as_ref(),
            Tier::Opus => self.opus.as_ref(),
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_string(key).unwrap_or_else(|| default.to_string())
}

fn env_bool(key: &str, default: bool) -> bool {
    match env_string(key) {
        Some(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

fn env_u16(key: &str, default: u16) -> u16 {
    env_string(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_string(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn tier_map(prefix_parts: &[&str; 3]) -> TierMap {
    TierMap {
        haiku: env_string(prefix_parts[0]),
        sonnet: env_string(prefix_parts[1]),
        opus: env_string(prefix_parts[2]),
    }
}

fn glm_model_for(tier_suffix: &str) -> Option<String> {
    env_string(&format!("ZAI_{tier_suffix}_MODEL"))
        .or_else(|| env_string(&format!("GLM_{tier_suffix}_MODEL")))
        .or_else(|| Some("glm-4.7".to_string()))
}

impl GlobalConfig {
    /// Resolve every documented environment variable (see SPEC_FULL.md §6)
    /// into a fully-populated `GlobalConfig`. CLI flags (apps/tierproxy) may
    /// overlay a handful of these fields after this call returns.
    pub fn from_env() -> Self {
        let glm_creds = TierCredMap {
            haiku: tier_cred("HAIKU"),
            sonnet: tier_cred("SONNET"),
            opus: tier_cred("OPUS"),
        };

        let default_providers = [
            (Tier::Sonnet, env_or("SONNET_PROVIDER", "antigravity")),
            (Tier::Haiku, env_or("HAIKU_PROVIDER", "antigravity")),
            (Tier::Opus, env_or("OPUS_PROVIDER", "anthropic")),
        ]
        .into_iter()
        .filter_map(|(tier, raw)| BackendType::parse(&raw).map(|backend| (tier, backend)))
        .collect();

        Self {
            host: env_or("PROXY_HOST", "127.0.0.1"),
            port: env_u16("PROXY_PORT", 8082),
            proxy_api_key: env_string("PROXY_API_KEY"),
            request_timeout_secs: env_u64("REQUEST_TIMEOUT", 300),
            data_dir: PathBuf::from(env_or("TIERPROXY_DATA_DIR", "./data")),
            log_file: env_string("CLAUDE_PROXY_LOG_FILE").map(PathBuf::from),

            anthropic_base_url: env_or("ANTHROPIC_BASE_URL", "https://api.anthropic.com"),
            anthropic_models: tier_map(&[
                "ANTHROPIC_HAIKU_MODEL",
                "ANTHROPIC_SONNET_MODEL",
                "ANTHROPIC_OPUS_MODEL",
            ]),

            glm_creds,
            glm_models: TierMap {
                haiku: glm_model_for("HAIKU"),
                sonnet: glm_model_for("SONNET"),
                opus: glm_model_for("OPUS"),
            },

            gemini_bridge_enabled: env_bool("ANTIGRAVITY_ENABLED", false),
            gemini_bridge_port: env_u16("ANTIGRAVITY_PORT", 8081),
            gemini_bridge_config_dir: env_string("ANTIGRAVITY_CONFIG_DIR").map(PathBuf::from),
            gemini_bridge_models: tier_map(&[
                "ANTIGRAVITY_HAIKU_MODEL",
                "ANTIGRAVITY_SONNET_MODEL",
                "ANTIGRAVITY_OPUS_MODEL",
            ]),

            copilot_enabled: env_bool("ENABLE_COPILOT", false),
            copilot_base_url: env_or("GITHUB_COPILOT_BASE_URL", "http://localhost:4141"),
            copilot_models: tier_map(&[
                "GITHUB_COPILOT_HAIKU_MODEL",
                "GITHUB_COPILOT_SONNET_MODEL",
                "GITHUB_COPILOT_OPUS_MODEL",
            ]),

            openrouter_api_key: env_string("OPENROUTER_API_KEY"),
            openrouter_base_url: env_or("OPENROUTER_BASE_URL", "https://openrouter.ai/api"),
            openrouter_models: tier_map(&[
                "OPENROUTER_HAIKU_MODEL",
                "OPENROUTER_SONNET_MODEL",
                "OPENROUTER_OPUS_MODEL",
            ]),

            custom_api_key: env_string("CUSTOM_PROVIDER_API_KEY"),
            custom_base_url: env_string("CUSTOM_PROVIDER_BASE_URL"),
            custom_models: tier_map(&[
                "CUSTOM_PROVIDER_HAIKU_MODEL",
                "CUSTOM_PROVIDER_SONNET_MODEL",
                "CUSTOM_PROVIDER_OPUS_MODEL",
            ]),

            default_providers,
        }
    }

    pub fn models_for(&self, backend: BackendType) -> &TierMap {
        match backend {
            BackendType::Anthropic => &self.anthropic_models,
            BackendType::Glm => &self.glm_models,
            BackendType::GeminiBridge => &self.gemini_bridge_models,
            BackendType::CopilotBridge => &self.copilot_models,
            BackendType::Openrouter => &self.openrouter_models,
            BackendType::Custom => &self.custom_models,
        }
    }
}

fn tier_cred(tier_suffix: &str) -> Option<TierCred> {
    let api_key = env_string(&format!("{tier_suffix}_PROVIDER_API_KEY"))?;
    let base_url = env_string(&format!("{tier_suffix}_PROVIDER_BASE_URL"))?;
    Some(TierCred { api_key, base_url })
}
