use std::sync::Arc;
use tracing::debug;

use crate::dto::bus_dto::FleetBusResponse;
use crate::repositories::BusLocationStore;
use crate::state::AppState;
use crate::utils::errors::AppResult;

/// Consulta pública de la flota para el mapa
pub struct FleetController {
    buses: Arc<dyn BusLocationStore>,
}

impl FleetController {
    pub fn new(state: &AppState) -> Self {
        Self {
            buses: state.buses.clone(),
        }
    }

    /// Todos los buses, con el conductor si lo tienen
    pub async fn list_fleet(&self) -> AppResult<Vec<FleetBusResponse>> {
        let fleet = self.buses.list_fleet().await?;
        debug!("🗺️ Flota consultada: {} buses", fleet.len());
        Ok(fleet.into_iter().map(FleetBusResponse::from).collect())
    }
}
