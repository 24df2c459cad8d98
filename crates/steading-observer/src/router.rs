//! Axum router construction for the control surface.
//!
//! Assembles all routes into a single [`Router`] with CORS middleware
//! enabled for cross-origin renderer access.

use axum::Router;
use axum::routing::{delete, get, patch, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router for the control surface.
///
/// CORS is configured to allow any origin for development. In
/// production this should be restricted.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/status", get(handlers::status))
        .route("/control/pause", post(handlers::pause))
        .route("/control/resume", post(handlers::resume))
        .route("/control/speed", post(handlers::set_speed))
        .route("/control/tick", post(handlers::set_tick))
        .route("/world/generate", post(handlers::generate_world))
        .route("/world/snapshot", get(handlers::world_snapshot))
        .route("/world/changes", get(handlers::world_changes))
        .route("/entities/agents", post(handlers::create_agent))
        .route("/entities/{id}", patch(handlers::move_entity))
        .route("/entities/{id}", delete(handlers::delete_entity))
        .route("/agents/{id}/suggest", post(handlers::suggest))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
