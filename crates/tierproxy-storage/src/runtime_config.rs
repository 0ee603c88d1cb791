use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tierproxy_common::{BackendType, Tier, time::now_rfc3339};

use crate::error::StorageError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierRoute {
    pub backend: BackendType,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub haiku: TierRoute,
    pub sonnet: TierRoute,
    pub opus: TierRoute,
    pub last_updated: String,
}

impl RuntimeConfig {
    pub fn tier(&self, tier: Tier) -> &TierRoute {
        match tier {
            Tier::Haiku => &self.haiku,
            Tier::Sonnet => &self.sonnet,
            Tier::Opus => &self.opus,
        }
    }

    fn tier_mut(&mut self, tier: Tier) -> &mut TierRoute {
        match tier {
            Tier::Haiku => &mut self.haiku,
            Tier::Sonnet => &mut self.sonnet,
            Tier::Opus => &mut self.opus,
        }
    }
}

/// Subset of `RuntimeConfig` accepted by `POST /config`: any combination of
/// `{sonnet,haiku,opus}_{provider,model}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeConfigPatch {
    pub sonnet_provider: Option<String>,
    pub haiku_provider: Option<String>,
    pub opus_provider: Option<String>,
    pub sonnet_model: Option<String>,
    pub haiku_model: Option<String>,
    pub opus_model: Option<String>,
}

impl RuntimeConfigPatch {
    pub fn is_empty(&self) -> bool {
        self.sonnet_provider.is_none()
            && self.haiku_provider.is_none()
            && self.opus_provider.is_none()
            && self.sonnet_model.is_none()
            && self.haiku_model.is_none()
            && self.opus_model.is_none()
    }

    /// Validates provider names before anything is mutated, so a bad request
    /// never partially applies.
    pub fn validate(&self) -> Result<(), String> {
        for (label, provider) in [
            ("sonnet_provider", &self.sonnet_provider),
            ("haiku_provider", &self.haiku_provider),
            ("opus_provider", &self.opus_provider),
        ] {
            if let Some(raw) = provider {
                if BackendType::parse(raw).is_none() {
                    return Err(format!("unknown provider for {label}: {raw}"));
                }
            }
        }
        Ok(())
    }

    fn apply_tier(&self, tier: Tier, route: &mut TierRoute) {
        let (provider, model) = match tier {
            Tier::Sonnet => (&self.sonnet_provider, &self.sonnet_model),
            Tier::Haiku => (&self.haiku_provider, &self.haiku_model),
            Tier::Opus => (&self.opus_provider, &self.opus_model),
        };
        if let Some(provider) = provider.as_deref().and_then(BackendType::parse) {
            route.backend = provider;
        }
        if let Some(model) = model {
            route.model = model.clone();
        }
    }
}

/// Owns the mutable per-tier routing table: one writer lock, readers share
/// it, persisted to `config.json` on every write.
pub struct ConfigStore {
    path: PathBuf,
    state: Mutex<RuntimeConfig>,
}

impl ConfigStore {
    pub async fn load_or_init(
        path: PathBuf,
        defaults: RuntimeConfig,
    ) -> Result<Self, StorageError> {
        let loaded = tierproxy_common::fs::read_json::<RuntimeConfig>(&path).await?;
        let existed = loaded.is_some();
        let config = loaded.unwrap_or(defaults);
        let store = Self {
            path,
            state: Mutex::new(config.clone()),
        };
        if !existed {
            store.persist(&config).await?;
        }
        Ok(store)
    }

    pub fn snapshot(&self) -> RuntimeConfig {
        self.state.lock().expect("config lock poisoned").clone()
    }

    pub fn tier(&self, tier: Tier) -> TierRoute {
        let guard = self.state.lock().expect("config lock poisoned");
        guard.tier(tier).clone()
    }

    pub async fn apply_patch(&self, patch: RuntimeConfigPatch) -> Result<RuntimeConfig, StorageError> {
        let updated = {
            let mut guard = self.state.lock().expect("config lock poisoned");
            for tier in Tier::ALL {
                let route = guard.tier_mut(tier);
                patch.apply_tier(tier, route);
            }
            guard.last_updated = now_rfc3339();
            guard.clone()
        };
        self.persist(&updated).await?;
        Ok(updated)
    }

    async fn persist(&self, config: &RuntimeConfig) -> Result<(), StorageError> {
        tierproxy_common::fs::write_json_atomic(&self.path, config).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RuntimeConfig {
        RuntimeConfig {
            haiku: TierRoute { backend: BackendType::GeminiBridge, model: "h".into() },
            sonnet: TierRoute { backend: BackendType::Glm, model: "s".into() },
            opus: TierRoute { backend: BackendType::Anthropic, model: "o".into() },
            last_updated: "1970-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn patch_rejects_unknown_provider() {
        let patch = RuntimeConfigPatch {
            sonnet_provider: Some("not_a_backend".into()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn patch_applies_only_named_tiers() {
        let mut config = sample();
        let patch = RuntimeConfigPatch {
            opus_provider: Some("custom".into()),
            ..Default::default()
        };
        patch.apply_tier(Tier::Opus, &mut config.opus);
        assert_eq!(config.opus.backend, BackendType::Custom);
        assert_eq!(config.opus.model, "o");
        assert_eq!(config.haiku.backend, BackendType::GeminiBridge);
    }
}
