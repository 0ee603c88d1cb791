use std::collections::HashMap;
use std::sync::Arc;

use tierproxy_common::{BackendType, GlobalConfig, LogRing};
use tierproxy_provider_core::BackendAdapter;
use tierproxy_storage::{ConfigStore, FavoritesStore, UsageTracker};

use crate::router::BackendAvailability;
use crate::subprocess::GeminiBridgeSupervisor;

/// Everything a request needs, assembled once at startup and shared behind
/// `Arc` rather than any module-level global (§9 design note: re-architect
/// mutable globals as a single server-state value passed into the
/// dispatcher).
pub struct ServerState {
    pub global: GlobalConfig,
    pub config_store: Arc<ConfigStore>,
    pub usage: Arc<UsageTracker>,
    pub favorites: Arc<FavoritesStore>,
    pub logs: Arc<LogRing>,
    pub availability: BackendAvailability,
    pub adapters: HashMap<BackendType, Arc<dyn BackendAdapter>>,
    pub gemini_bridge: Option<Arc<GeminiBridgeSupervisor>>,
}

impl ServerState {
    pub fn adapter_for(&self, backend: BackendType) -> Option<Arc<dyn BackendAdapter>> {
        self.adapters.get(&backend).cloned()
    }
}
