use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::dto::bus_dto::{
    AssignBusRequest, AssignmentOverview, AssignmentResponse, BusResponse, DriverResponse,
    SetStatusRequest, UpdateBusRequest,
};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::auth::{Capability, UserRole};
use crate::repositories::{BusLocationStore, UserStore};
use crate::services::authorization_service::AuthorizationService;
use crate::state::AppState;
use crate::utils::errors::AppResult;
use crate::utils::validation::check_bounds;

/// Gestión de la flota por parte del administrador
pub struct AssignmentController {
    buses: Arc<dyn BusLocationStore>,
    users: Arc<dyn UserStore>,
    default_position: (f64, f64),
    enforce_bounds: bool,
}

impl AssignmentController {
    pub fn new(state: &AppState) -> Self {
        Self {
            buses: state.buses.clone(),
            users: state.users.clone(),
            default_position: state.config.default_campus_position(),
            enforce_bounds: state.config.enforce_coordinate_bounds,
        }
    }

    /// Asignar un conductor a un bus por etiqueta. Crea el bus en la
    /// posición por defecto del campus si no existe.
    pub async fn assign(
        &self,
        user: &AuthenticatedUser,
        request: AssignBusRequest,
    ) -> AppResult<ApiResponse<BusResponse>> {
        AuthorizationService::require(user, Capability::ManageFleet)?;
        request.validate()?;

        let bus = self
            .buses
            .assign(
                request.bus_tag.trim(),
                request.route.trim(),
                request.driver_id,
                self.default_position,
            )
            .await?;

        info!(
            "🔗 Bus {} asignado al conductor {} por {}",
            bus.bus_tag, request.driver_id, user.username
        );
        Ok(ApiResponse::success_with_message(
            bus.into(),
            "Bus assigned successfully",
        ))
    }

    pub async fn list_drivers(&self, user: &AuthenticatedUser) -> AppResult<Vec<DriverResponse>> {
        AuthorizationService::require(user, Capability::ManageFleet)?;

        let drivers = self.users.list_users_by_role(UserRole::Driver).await?;
        Ok(drivers.into_iter().map(DriverResponse::from).collect())
    }

    /// Conductores elegibles y asignaciones actuales
    pub async fn overview(&self, user: &AuthenticatedUser) -> AppResult<AssignmentOverview> {
        let drivers = self.list_drivers(user).await?;
        let assignments = self
            .buses
            .list_fleet()
            .await?
            .into_iter()
            .map(AssignmentResponse::from)
            .collect();

        Ok(AssignmentOverview { drivers, assignments })
    }

    /// Alta o edición directa de un bus por etiqueta
    pub async fn update_bus(
        &self,
        user: &AuthenticatedUser,
        request: UpdateBusRequest,
    ) -> AppResult<ApiResponse<BusResponse>> {
        AuthorizationService::require(user, Capability::ManageFleet)?;
        request.validate()?;
        check_bounds(request.latitude, request.longitude, self.enforce_bounds)?;

        let bus = self
            .buses
            .upsert_by_tag(
                request.bus_tag.trim(),
                request.route.trim(),
                request.latitude,
                request.longitude,
            )
            .await?;

        info!("🛠️ Bus {} actualizado por {}", bus.bus_tag, user.username);
        Ok(ApiResponse::success_with_message(
            bus.into(),
            "Bus location updated successfully",
        ))
    }

    /// Cambio de estado administrativo (p. ej. mantenimiento)
    pub async fn set_status(
        &self,
        user: &AuthenticatedUser,
        bus_id: i64,
        request: SetStatusRequest,
    ) -> AppResult<ApiResponse<BusResponse>> {
        AuthorizationService::require(user, Capability::ManageFleet)?;

        let bus = self.buses.set_status(bus_id, request.status).await?;

        info!("🔧 Bus {} -> {} por {}", bus.bus_tag, bus.status, user.username);
        Ok(ApiResponse::success_with_message(bus.into(), "Bus status updated"))
    }
}
