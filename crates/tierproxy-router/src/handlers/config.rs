use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tierproxy_common::{BackendType, Tier};
use tierproxy_core::ServerState;
use tierproxy_storage::RuntimeConfigPatch;

use super::{bad_request, internal_error};

const BACKENDS: [BackendType; 6] = [
    BackendType::Anthropic,
    BackendType::Glm,
    BackendType::GeminiBridge,
    BackendType::CopilotBridge,
    BackendType::Openrouter,
    BackendType::Custom,
];

pub async fn get_config(State(state): State<Arc<ServerState>>) -> Response {
    let config = state.config_store.snapshot();

    let models_per_backend: serde_json::Map<String, serde_json::Value> = BACKENDS
        .into_iter()
        .map(|backend| {
            let models = state.global.models_for(backend);
            (
                backend.as_str().to_string(),
                json!({
                    "haiku": models.get(Tier::Haiku),
                    "sonnet": models.get(Tier::Sonnet),
                    "opus": models.get(Tier::Opus),
                }),
            )
        })
        .collect();

    let body = json!({
        "config": config,
        "available_backends": BACKENDS.iter().map(|b| b.as_str()).collect::<Vec<_>>(),
        "models_per_backend": models_per_backend,
    });
    (axum::http::StatusCode::OK, axum::Json(body)).into_response()
}

pub async fn patch_config(
    State(state): State<Arc<ServerState>>,
    Json(patch): Json<RuntimeConfigPatch>,
) -> Response {
    if let Err(message) = patch.validate() {
        return bad_request(message);
    }
    if patch.is_empty() {
        return bad_request("patch did not name any of sonnet_provider, haiku_provider, opus_provider, sonnet_model, haiku_model, opus_model");
    }

    match state.config_store.apply_patch(patch).await {
        Ok(updated) => (axum::http::StatusCode::OK, axum::Json(json!({ "config": updated }))).into_response(),
        Err(err) => internal_error(err.to_string()),
    }
}
