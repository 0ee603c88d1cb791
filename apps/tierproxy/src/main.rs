use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::StatusCode;
use axum::routing::get;
use clap::Parser;
use tierproxy_common::{BackendType, GlobalConfig, LogRing, Tier};
use tierproxy_core::router::BackendAvailability;
use tierproxy_core::{GeminiBridgeSupervisor, ServerState};
use tierproxy_provider_core::BackendAdapter;
use tierproxy_storage::{ConfigStore, FavoritesStore, RuntimeConfig, TierRoute, UsageTracker};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    let mut global = GlobalConfig::from_env();
    cli.apply(&mut global);

    let logs = Arc::new(LogRing::new());
    init_tracing(&cli.log_level, logs.clone());

    tokio::fs::create_dir_all(&global.data_dir)
        .await
        .with_context(|| format!("creating data directory {}", global.data_dir.display()))?;

    let config_store = Arc::new(
        ConfigStore::load_or_init(global.data_dir.join("config.json"), default_runtime_config(&global))
            .await
            .context("loading config.json")?,
    );
    let favorites = Arc::new(
        FavoritesStore::load(global.data_dir.join("favorites.json"))
            .await
            .context("loading favorites.json")?,
    );
    let usage = Arc::new(
        UsageTracker::load(global.data_dir.join("token_usage.json"))
            .await
            .context("loading token_usage.json")?,
    );

    let availability = BackendAvailability::from_global(&global);
    let adapters = build_adapters(&global);

    let gemini_bridge = if global.gemini_bridge_enabled {
        GeminiBridgeSupervisor::spawn(global.gemini_bridge_port, global.gemini_bridge_config_dir.as_deref())
            .await
            .map(Arc::new)
    } else {
        None
    };

    let host = global.host.clone();
    let port = global.port;

    let state = Arc::new(ServerState {
        global,
        config_store,
        usage,
        favorites,
        logs,
        availability,
        adapters,
        gemini_bridge: gemini_bridge.clone(),
    });

    let app = tierproxy_router::build_router(state)
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }));

    let bind = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&bind).await.with_context(|| format!("binding {bind}"))?;
    tracing::info!(%bind, "tierproxy listening");

    let serve = axum::serve(listener, app);
    tokio::select! {
        result = serve => result.context("server error")?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received ctrl-c, shutting down");
        }
    }

    if let Some(bridge) = gemini_bridge {
        bridge.shutdown().await;
    }

    Ok(())
}

fn init_tracing(log_level: &str, logs: Arc<LogRing>) {
    let filter = tracing_subscriber::EnvFilter::try_new(log_level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with((*logs).clone())
        .init();
}

/// Seeds `config.json` the first time the process runs against an empty data
/// directory, using `{SONNET,HAIKU,OPUS}_PROVIDER` and that backend's
/// configured model for the tier (falling back to a native Anthropic model
/// name so the route is never pointed at an empty string).
fn default_runtime_config(global: &GlobalConfig) -> RuntimeConfig {
    let route_for = |tier: Tier, fallback_model: &str| {
        let backend = global.default_providers.get(&tier).copied().unwrap_or(BackendType::Anthropic);
        let model = global
            .models_for(backend)
            .get(tier)
            .map(str::to_string)
            .unwrap_or_else(|| fallback_model.to_string());
        TierRoute { backend, model }
    };

    RuntimeConfig {
        haiku: route_for(Tier::Haiku, "claude-3-5-haiku-20241022"),
        sonnet: route_for(Tier::Sonnet, "claude-sonnet-4-5-20250929"),
        opus: route_for(Tier::Opus, "claude-opus-4-20250514"),
        last_updated: tierproxy_common::time::now_rfc3339(),
    }
}

fn build_adapters(global: &GlobalConfig) -> HashMap<BackendType, Arc<dyn BackendAdapter>> {
    let mut adapters: HashMap<BackendType, Arc<dyn BackendAdapter>> = HashMap::new();

    let credentials = Arc::new(tierproxy_provider_impl::CredentialManager::new(default_credentials_path()));
    adapters.insert(
        BackendType::Anthropic,
        Arc::new(tierproxy_provider_impl::AnthropicAdapter::new(global.anthropic_base_url.clone(), credentials)),
    );

    adapters.insert(BackendType::Glm, Arc::new(tierproxy_provider_impl::GlmAdapter::new(global.glm_creds.clone())));

    adapters.insert(
        BackendType::GeminiBridge,
        Arc::new(tierproxy_provider_impl::GeminiBridgeAdapter::new(format!(
            "http://127.0.0.1:{}",
            global.gemini_bridge_port
        ))),
    );

    adapters.insert(
        BackendType::CopilotBridge,
        Arc::new(tierproxy_provider_impl::CopilotBridgeAdapter::new(global.copilot_base_url.clone())),
    );

    if let Some(api_key) = &global.openrouter_api_key {
        adapters.insert(
            BackendType::Openrouter,
            Arc::new(tierproxy_provider_impl::OpenrouterAdapter::new(global.openrouter_base_url.clone(), api_key.clone())),
        );
    }

    if let (Some(api_key), Some(base_url)) = (&global.custom_api_key, &global.custom_base_url) {
        adapters.insert(
            BackendType::Custom,
            Arc::new(tierproxy_provider_impl::CustomAdapter::new(base_url.clone(), api_key.clone())),
        );
    }

    adapters
}

fn default_credentials_path() -> std::path::PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        return std::path::PathBuf::from(home).join(".claude").join(".credentials.json");
    }
    std::path::PathBuf::from(".claude/.credentials.json")
}
