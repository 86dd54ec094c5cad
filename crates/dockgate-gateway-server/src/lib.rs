pub mod config;
pub mod handlers;

use axum::{
    routing::{delete, get},
    Router,
};
use dockgate_gateway::LifecycleGateway;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::GatewayConfig;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<LifecycleGateway>,
}

impl AppState {
    pub fn new(gateway: LifecycleGateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/containers", get(handlers::list_containers))
        .route("/containers/inspect/:id", get(handlers::inspect_container))
        .route("/containers/logs/:id", get(handlers::container_logs))
        // DELETE removes the named container, PUT runs a bulk action
        .route(
            "/containers/:id",
            delete(handlers::delete_container).put(handlers::apply_action),
        )
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests;
