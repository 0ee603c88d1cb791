use std::collections::HashMap;

use tierproxy_common::{BackendType, Tier};
use tierproxy_storage::RuntimeConfig;

/// Per-tier, per-backend prerequisite checks resolved once at startup from
/// `GlobalConfig`. The router consults this before handing a request to a
/// backend so a missing credential surfaces as `misconfigured` rather than a
/// confusing upstream failure.
#[derive(Debug, Clone, Default)]
pub struct BackendAvailability {
    pub glm: HashMap<Tier, bool>,
    pub gemini_bridge: bool,
    pub copilot_bridge: bool,
    pub openrouter: bool,
    pub custom: bool,
}

impl BackendAvailability {
    pub fn from_global(global: &tierproxy_common::GlobalConfig) -> Self {
        let glm = Tier::ALL
            .into_iter()
            .map(|tier| (tier, global.glm_creds.get(tier).is_some()))
            .collect();
        Self {
            glm,
            gemini_bridge: global.gemini_bridge_enabled,
            copilot_bridge: global.copilot_enabled,
            openrouter: global.openrouter_api_key.is_some(),
            custom: global.custom_api_key.is_some() && global.custom_base_url.is_some(),
        }
    }

    fn is_available(&self, backend: BackendType, tier: Tier) -> bool {
        match backend {
            BackendType::Anthropic => true,
            BackendType::Glm => self.glm.get(&tier).copied().unwrap_or(false),
            BackendType::GeminiBridge => self.gemini_bridge,
            BackendType::CopilotBridge => self.copilot_bridge,
            BackendType::Openrouter => self.openrouter,
            BackendType::Custom => self.custom,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteDecision {
    pub tier: Tier,
    pub backend: BackendType,
    pub outbound_model: String,
}

#[derive(Debug, Clone)]
pub struct Misconfigured {
    pub tier: Tier,
    pub backend: BackendType,
}

/// Classifies an incoming model name into a tier. Pure function of the name
/// and the current routing table; first matching rule wins (§4.1).
pub fn classify_tier(incoming_model: &str, config: &RuntimeConfig) -> Tier {
    for tier in Tier::ALL {
        if config.tier(tier).model == incoming_model {
            return tier;
        }
    }

    let lower = incoming_model.to_ascii_lowercase();
    if lower.contains("haiku") {
        return Tier::Haiku;
    }
    if lower.contains("sonnet") {
        return Tier::Sonnet;
    }
    if lower.contains("opus") {
        return Tier::Opus;
    }

    if lower.starts_with("glm-") || lower.starts_with("zai-") {
        return if lower.contains("flash") || lower.contains('5') { Tier::Haiku } else { Tier::Sonnet };
    }
    if lower.starts_with("gemini-") {
        return if lower.contains("flash") { Tier::Haiku } else { Tier::Sonnet };
    }

    tracing::warn!(model = %incoming_model, "unrecognized model name, defaulting to haiku tier");
    Tier::Haiku
}

/// Given a tier, resolves the configured backend and validates its
/// prerequisites. Never falls back to a different backend on
/// misconfiguration (§4.1 rationale: silent fallback masks config errors).
pub fn select_backend(
    tier: Tier,
    config: &RuntimeConfig,
    availability: &BackendAvailability,
    incoming_model: &str,
) -> Result<RouteDecision, Misconfigured> {
    let route = config.tier(tier);
    let backend = route.backend;

    if !availability.is_available(backend, tier) {
        return Err(Misconfigured { tier, backend });
    }

    let outbound_model = if backend == BackendType::Anthropic {
        incoming_model.to_string()
    } else {
        route.model.clone()
    };

    Ok(RouteDecision { tier, backend, outbound_model: strip_1m_suffix(&outbound_model) })
}

/// Strips the literal `[1m]` suffix some clients append to Anthropic model
/// identifiers (a context-window hint, not part of the model name itself).
fn strip_1m_suffix(model: &str) -> String {
    model.strip_suffix("[1m]").unwrap_or(model).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tierproxy_storage::TierRoute;

    fn config() -> RuntimeConfig {
        RuntimeConfig {
            haiku: TierRoute { backend: BackendType::GeminiBridge, model: "gemini-2.0-flash".into() },
            sonnet: TierRoute { backend: BackendType::Glm, model: "glm-4.7".into() },
            opus: TierRoute { backend: BackendType::Anthropic, model: "claude-opus-4-20250514".into() },
            last_updated: "1970-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn classifies_by_exact_backend_model_match() {
        assert_eq!(classify_tier("glm-4.7", &config()), Tier::Sonnet);
    }

    #[test]
    fn classifies_by_nickname_substring() {
        assert_eq!(classify_tier("claude-3-5-haiku-20241022", &config()), Tier::Haiku);
        assert_eq!(classify_tier("my-custom-sonnet-model", &config()), Tier::Sonnet);
    }

    #[test]
    fn classifies_glm_union_rule() {
        assert_eq!(classify_tier("glm-4.5-flash", &config()), Tier::Haiku);
        assert_eq!(classify_tier("glm-4.5", &config()), Tier::Haiku);
        assert_eq!(classify_tier("glm-4.7-pro", &config()), Tier::Sonnet);
    }

    #[test]
    fn classifies_gemini_prefix() {
        assert_eq!(classify_tier("gemini-1.5-flash", &config()), Tier::Haiku);
        assert_eq!(classify_tier("gemini-1.5-pro", &config()), Tier::Sonnet);
    }

    #[test]
    fn falls_back_to_haiku() {
        assert_eq!(classify_tier("some-unknown-model", &config()), Tier::Haiku);
    }

    #[test]
    fn strips_1m_suffix() {
        assert_eq!(strip_1m_suffix("claude-sonnet-4-5-20250929[1m]"), "claude-sonnet-4-5-20250929");
    }

    #[test]
    fn select_backend_rejects_missing_prerequisite() {
        let availability = BackendAvailability::default();
        let err = select_backend(Tier::Sonnet, &config(), &availability, "glm-4.7").unwrap_err();
        assert_eq!(err.backend, BackendType::Glm);
    }

    #[test]
    fn select_backend_passes_through_native_model_name() {
        let mut availability = BackendAvailability::default();
        availability.glm.insert(Tier::Sonnet, true);
        let decision = select_backend(Tier::Opus, &config(), &availability, "claude-opus-4-20250514[1m]").unwrap();
        assert_eq!(decision.backend, BackendType::Anthropic);
        assert_eq!(decision.outbound_model, "claude-opus-4-20250514");
    }
}
