use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::controllers::fleet_controller::FleetController;
use crate::dto::bus_dto::FleetBusResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Rutas públicas: mapa de la flota y health check
pub fn fleet_routes() -> Router<AppState> {
    Router::new()
        .route("/api/buses", get(list_buses))
        .route("/health", get(health))
}

async fn list_buses(
    State(state): State<AppState>,
) -> Result<Json<Vec<FleetBusResponse>>, AppError> {
    let controller = FleetController::new(&state);
    let fleet = controller.list_fleet().await?;
    Ok(Json(fleet))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "store": state.backend.as_str(),
        "environment": state.config.environment,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
