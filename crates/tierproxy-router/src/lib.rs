pub mod handlers;
pub mod middleware;
pub mod response;

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tierproxy_core::ServerState;

/// Builds the full HTTP surface: the `/v1/messages` family, runtime config,
/// favorites, logs and usage endpoints, plus the unauthenticated `/health`
/// liveness check. Auth middleware wraps everything so handlers never have
/// to remember to check it themselves.
pub fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/v1/messages", post(handlers::messages::create_message))
        .route(
            "/v1/messages/count_tokens",
            post(handlers::messages::count_tokens),
        )
        .route("/health", get(handlers::health::health))
        .route(
            "/config",
            get(handlers::config::get_config).post(handlers::config::patch_config),
        )
        .route(
            "/favorites",
            get(handlers::favorites::list).post(handlers::favorites::add),
        )
        .route("/favorites/{index}", delete(handlers::favorites::remove))
        .route("/logs", get(handlers::logs::list))
        .route("/logs/clear", post(handlers::logs::clear))
        .route("/api/usage/stats", get(handlers::usage::stats))
        .route("/api/usage/reset", post(handlers::usage::reset))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ))
        .with_state(state)
}
