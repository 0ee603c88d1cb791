use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tierproxy_common::Tier;
use tierproxy_core::ServerState;

/// Liveness plus a summary of the current routing table and which backends
/// have their prerequisites met, so an operator can tell "is it up" from
/// "is it correctly configured" at a glance.
pub async fn health(State(state): State<Arc<ServerState>>) -> Response {
    let config = state.config_store.snapshot();
    let routing: serde_json::Map<String, serde_json::Value> = Tier::ALL
        .into_iter()
        .map(|tier| {
            let route = config.tier(tier);
            (
                tier.as_str().to_string(),
                json!({ "backend": route.backend, "model": route.model }),
            )
        })
        .collect();

    let gemini_bridge_supervised = state.gemini_bridge.is_some();

    let body = json!({
        "status": "ok",
        "routing": routing,
        "backends": {
            "anthropic": true,
            "glm": {
                "haiku": state.availability.glm.get(&Tier::Haiku).copied().unwrap_or(false),
                "sonnet": state.availability.glm.get(&Tier::Sonnet).copied().unwrap_or(false),
                "opus": state.availability.glm.get(&Tier::Opus).copied().unwrap_or(false),
            },
            "gemini_bridge": state.availability.gemini_bridge,
            "copilot_bridge": state.availability.copilot_bridge,
            "openrouter": state.availability.openrouter,
            "custom": state.availability.custom,
        },
        "gemini_bridge_supervised": gemini_bridge_supervised,
    });
    (axum::http::StatusCode::OK, axum::Json(body)).into_response()
}
