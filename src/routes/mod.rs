//! Rutas HTTP
//!
//! `create_router` monta todas las rutas sobre un `AppState` ya construido.

pub mod auth_routes;
pub mod driver_routes;
pub mod editor_routes;
pub mod fleet_routes;

use axum::Router;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::middleware::cors::cors_middleware;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let cors = cors_middleware(&state.config);

    Router::new()
        .merge(fleet_routes::fleet_routes())
        .nest("/auth", auth_routes::auth_routes(state.clone()))
        .nest("/driver", driver_routes::driver_routes(state.clone()))
        .nest("/editor", editor_routes::editor_routes(state.clone()))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
