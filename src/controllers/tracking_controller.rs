use std::sync::Arc;
use tracing::{debug, info};

use crate::middleware::auth::AuthenticatedUser;
use crate::models::auth::Capability;
use crate::models::bus::{BusLocation, BusStatus};
use crate::repositories::{BusLocationStore, StoreError};
use crate::services::authorization_service::AuthorizationService;
use crate::state::AppState;
use crate::utils::errors::AppResult;
use crate::utils::validation::{parse_json_body, parse_position};

/// Operaciones del conductor sobre sus buses: posición y arranque/parada
pub struct TrackingController {
    buses: Arc<dyn BusLocationStore>,
    enforce_bounds: bool,
}

impl TrackingController {
    pub fn new(state: &AppState) -> Self {
        Self {
            buses: state.buses.clone(),
            enforce_bounds: state.config.enforce_coordinate_bounds,
        }
    }

    /// Registrar una nueva posición enviada por el conductor asignado.
    /// Sólo cambian latitud, longitud y `last_update`.
    ///
    /// Orden de comprobación: rol, existencia y dueño del bus, cuerpo. Quien
    /// no es dueño recibe siempre un error de permisos, sea cual sea el
    /// cuerpo. La escritura condicionada sigue siendo la garantía final
    /// frente a una reasignación concurrente.
    pub async fn push_location(
        &self,
        user: &AuthenticatedUser,
        bus_id: i64,
        body: &[u8],
    ) -> AppResult<BusLocation> {
        AuthorizationService::require(user, Capability::ReportPosition)?;

        let bus = self
            .buses
            .find_by_id(bus_id)
            .await?
            .ok_or(StoreError::NotFound(bus_id))?;
        if !bus.is_assigned_to(user.user_id) {
            return Err(StoreError::NotAssigned {
                bus_id,
                driver_id: user.user_id,
            }
            .into());
        }

        let body = parse_json_body(body)?;
        let (latitude, longitude) = parse_position(&body, self.enforce_bounds)?;

        let bus = self
            .buses
            .update_position(bus_id, user.user_id, latitude, longitude)
            .await?;

        debug!(
            "📍 Bus {} ({}) en [{:.5}, {:.5}] por {}",
            bus.bus_tag, bus.id, latitude, longitude, user.username
        );
        Ok(bus)
    }

    pub async fn start_tracking(
        &self,
        user: &AuthenticatedUser,
        bus_id: i64,
    ) -> AppResult<BusLocation> {
        self.transition(user, bus_id, BusStatus::Active).await
    }

    pub async fn stop_tracking(
        &self,
        user: &AuthenticatedUser,
        bus_id: i64,
    ) -> AppResult<BusLocation> {
        self.transition(user, bus_id, BusStatus::Inactive).await
    }

    /// Buses asignados al conductor (su panel)
    pub async fn assigned_buses(&self, user: &AuthenticatedUser) -> AppResult<Vec<BusLocation>> {
        AuthorizationService::require(user, Capability::ReportPosition)?;
        Ok(self.buses.list_by_driver(user.user_id).await?)
    }

    async fn transition(
        &self,
        user: &AuthenticatedUser,
        bus_id: i64,
        status: BusStatus,
    ) -> AppResult<BusLocation> {
        AuthorizationService::require(user, Capability::ReportPosition)?;

        let bus = self
            .buses
            .set_status_by_driver(bus_id, user.user_id, status)
            .await?;

        info!("🚌 Bus {} -> {} ({})", bus.bus_tag, bus.status, user.username);
        Ok(bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvironmentConfig;
    use crate::models::auth::UserRole;
    use crate::models::user::NewUser;
    use crate::repositories::{MemoryStore, UserStore};
    use crate::utils::errors::{AppError, InputErrorKind};
    use serde_json::{json, Value};

    const CAMPUS: (f64, f64) = (6.67233, -1.56927);

    fn body(value: Value) -> Vec<u8> {
        value.to_string().into_bytes()
    }

    struct Fixture {
        store: MemoryStore,
        controller: TrackingController,
        owner: AuthenticatedUser,
        other: AuthenticatedUser,
        bus: BusLocation,
    }

    async fn user(store: &MemoryStore, name: &str, role: UserRole) -> AuthenticatedUser {
        store
            .create_user(NewUser {
                username: name.to_string(),
                email: format!("{name}@example.com"),
                password_hash: "x".to_string(),
                role,
            })
            .await
            .unwrap()
            .into()
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let owner = user(&store, "driver1", UserRole::Driver).await;
        let other = user(&store, "driver2", UserRole::Driver).await;
        let bus = store.assign("B12", "Campus Loop", owner.user_id, CAMPUS).await.unwrap();
        let state = AppState::with_memory_store(EnvironmentConfig::default(), store.clone());

        Fixture {
            controller: TrackingController::new(&state),
            store,
            owner,
            other,
            bus,
        }
    }

    #[tokio::test]
    async fn test_push_location_updates_only_position() {
        let f = fixture().await;
        f.store.set_status_by_driver(f.bus.id, f.owner.user_id, BusStatus::Active).await.unwrap();

        let position = body(json!({ "latitude": 6.6801, "longitude": -1.5702 }));
        let updated = f
            .controller
            .push_location(&f.owner, f.bus.id, &position)
            .await
            .unwrap();

        assert_eq!((updated.latitude, updated.longitude), (6.6801, -1.5702));
        assert!(updated.last_update >= f.bus.last_update);
        assert_eq!(updated.status, BusStatus::Active);
        assert_eq!(updated.driver_id, Some(f.owner.user_id));
        assert_eq!(updated.route, "Campus Loop");
    }

    #[tokio::test]
    async fn test_push_location_by_non_owner_never_mutates() {
        let f = fixture().await;

        let position = body(json!({ "latitude": 1.0, "longitude": 1.0 }));
        let err = f
            .controller
            .push_location(&f.other, f.bus.id, &position)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Store(StoreError::NotAssigned { .. })));
        assert_eq!(f.store.find_by_id(f.bus.id).await.unwrap().unwrap(), f.bus);
    }

    #[tokio::test]
    async fn test_non_owner_gets_permission_error_whatever_the_body() {
        let f = fixture().await;

        for raw in [body(json!({})), b"".to_vec(), b"{lat".to_vec()] {
            let err = f
                .controller
                .push_location(&f.other, f.bus.id, &raw)
                .await
                .unwrap_err();
            assert_eq!(err.code(), "NOT_ASSIGNED");
        }
        assert_eq!(f.store.find_by_id(f.bus.id).await.unwrap().unwrap(), f.bus);
    }

    #[tokio::test]
    async fn test_unknown_bus_is_not_found_before_body_checks() {
        let f = fixture().await;

        let err = f
            .controller
            .push_location(&f.other, 9999, &body(json!({ "latitude": "x", "longitude": 1 })))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Store(StoreError::NotFound(9999))));
    }

    #[tokio::test]
    async fn test_push_location_rejects_non_driver_role() {
        let f = fixture().await;
        let admin = user(&f.store, "admin", UserRole::Admin).await;

        let position = body(json!({ "latitude": 1.0, "longitude": 1.0 }));
        let err = f
            .controller
            .push_location(&admin, f.bus.id, &position)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden { code: "UNAUTHORIZED", .. }));
    }

    #[tokio::test]
    async fn test_push_location_validates_body() {
        let f = fixture().await;

        let err = f
            .controller
            .push_location(&f.owner, f.bus.id, &body(json!({ "longitude": 1.0 })))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Input { kind: InputErrorKind::MissingField, .. }));

        let out_of_range = body(json!({ "latitude": 95.0, "longitude": 1.0 }));
        let err = f
            .controller
            .push_location(&f.owner, f.bus.id, &out_of_range)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Input { kind: InputErrorKind::OutOfRange, .. }));
        assert_eq!(f.store.find_by_id(f.bus.id).await.unwrap().unwrap(), f.bus);
    }

    #[tokio::test]
    async fn test_start_then_stop_returns_to_inactive() {
        let f = fixture().await;

        let started = f.controller.start_tracking(&f.owner, f.bus.id).await.unwrap();
        assert_eq!(started.status, BusStatus::Active);

        let stopped = f.controller.stop_tracking(&f.owner, f.bus.id).await.unwrap();
        assert_eq!(stopped.status, BusStatus::Inactive);
    }

    #[tokio::test]
    async fn test_start_by_other_driver_leaves_status_unchanged() {
        let f = fixture().await;

        let err = f.controller.start_tracking(&f.other, f.bus.id).await.unwrap_err();
        assert_eq!(err.code(), "NOT_ASSIGNED");

        let bus = f.store.find_by_id(f.bus.id).await.unwrap().unwrap();
        assert_eq!(bus.status, BusStatus::Inactive);
    }

    #[tokio::test]
    async fn test_start_tracking_from_maintenance() {
        let f = fixture().await;
        f.store.set_status(f.bus.id, BusStatus::Maintenance).await.unwrap();

        let started = f.controller.start_tracking(&f.owner, f.bus.id).await.unwrap();
        assert_eq!(started.status, BusStatus::Active);
    }

    #[tokio::test]
    async fn test_assigned_buses_lists_only_own() {
        let f = fixture().await;
        f.store.assign("A1", "Hall Shuttle", f.other.user_id, CAMPUS).await.unwrap();
        f.store.assign("C3", "Night Route", f.owner.user_id, CAMPUS).await.unwrap();

        let tags: Vec<String> = f
            .controller
            .assigned_buses(&f.owner)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.bus_tag)
            .collect();
        assert_eq!(tags, vec!["B12", "C3"]);
    }
}
