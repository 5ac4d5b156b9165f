//! Almacén en memoria
//!
//! Implementa `BusLocationStore` y `UserStore` sobre un único `RwLock`.
//! Las escrituras toman el lock exclusivo, así que quedan linealizadas;
//! `list_fleet` arma la vista bajo un solo lock de lectura.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{BusLocationStore, StoreError, UserStore};
use crate::models::auth::UserRole;
use crate::models::bus::{BusLocation, BusStatus, FleetEntry};
use crate::models::user::{NewUser, User};

#[derive(Debug, Default)]
struct MemoryState {
    users: BTreeMap<i64, User>,
    buses: BTreeMap<i64, BusLocation>,
    tag_index: HashMap<String, i64>,
    last_user_id: i64,
    last_bus_id: i64,
}

impl MemoryState {
    fn driver_owned_bus(
        &mut self,
        id: i64,
        driver_id: i64,
    ) -> Result<&mut BusLocation, StoreError> {
        let bus = self.buses.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if !bus.is_assigned_to(driver_id) {
            return Err(StoreError::NotAssigned { bus_id: id, driver_id });
        }
        Ok(bus)
    }

    fn insert_bus(
        &mut self,
        bus_tag: &str,
        route: &str,
        latitude: f64,
        longitude: f64,
        driver_id: Option<i64>,
    ) -> BusLocation {
        self.last_bus_id += 1;
        let bus = BusLocation {
            id: self.last_bus_id,
            bus_tag: bus_tag.to_string(),
            route: route.to_string(),
            latitude,
            longitude,
            last_update: Utc::now(),
            status: BusStatus::Inactive,
            driver_id,
        };
        self.tag_index.insert(bus.bus_tag.clone(), bus.id);
        self.buses.insert(bus.id, bus.clone());
        bus
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BusLocationStore for MemoryStore {
    async fn upsert_by_tag(
        &self,
        bus_tag: &str,
        route: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<BusLocation, StoreError> {
        let mut state = self.state.write().await;

        if let Some(id) = state.tag_index.get(bus_tag).copied() {
            let bus = state.buses.get_mut(&id).ok_or(StoreError::NotFound(id))?;
            bus.route = route.to_string();
            bus.latitude = latitude;
            bus.longitude = longitude;
            bus.last_update = Utc::now();
            return Ok(bus.clone());
        }

        Ok(state.insert_bus(bus_tag, route, latitude, longitude, None))
    }

    async fn assign(
        &self,
        bus_tag: &str,
        route: &str,
        driver_id: i64,
        default_position: (f64, f64),
    ) -> Result<BusLocation, StoreError> {
        let mut state = self.state.write().await;

        let is_driver = state.users.get(&driver_id).is_some_and(User::is_driver);
        if !is_driver {
            return Err(StoreError::NotADriver(driver_id));
        }

        if let Some(id) = state.tag_index.get(bus_tag).copied() {
            let bus = state.buses.get_mut(&id).ok_or(StoreError::NotFound(id))?;
            bus.route = route.to_string();
            bus.driver_id = Some(driver_id);
            return Ok(bus.clone());
        }

        let (latitude, longitude) = default_position;
        Ok(state.insert_bus(bus_tag, route, latitude, longitude, Some(driver_id)))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<BusLocation>, StoreError> {
        Ok(self.state.read().await.buses.get(&id).cloned())
    }

    async fn list_fleet(&self) -> Result<Vec<FleetEntry>, StoreError> {
        let state = self.state.read().await;

        let fleet = state
            .buses
            .values()
            .map(|bus| FleetEntry {
                bus: bus.clone(),
                driver_username: bus
                    .driver_id
                    .and_then(|id| state.users.get(&id))
                    .map(|user| user.username.clone()),
            })
            .collect();

        Ok(fleet)
    }

    async fn list_by_driver(&self, driver_id: i64) -> Result<Vec<BusLocation>, StoreError> {
        let state = self.state.read().await;

        let mut buses: Vec<BusLocation> = state
            .buses
            .values()
            .filter(|bus| bus.is_assigned_to(driver_id))
            .cloned()
            .collect();
        buses.sort_by(|a, b| a.bus_tag.cmp(&b.bus_tag));

        Ok(buses)
    }

    async fn update_position(
        &self,
        id: i64,
        driver_id: i64,
        latitude: f64,
        longitude: f64,
    ) -> Result<BusLocation, StoreError> {
        let mut state = self.state.write().await;

        let bus = state.driver_owned_bus(id, driver_id)?;
        bus.latitude = latitude;
        bus.longitude = longitude;
        bus.last_update = Utc::now();
        Ok(bus.clone())
    }

    async fn set_status_by_driver(
        &self,
        id: i64,
        driver_id: i64,
        status: BusStatus,
    ) -> Result<BusLocation, StoreError> {
        let mut state = self.state.write().await;

        let bus = state.driver_owned_bus(id, driver_id)?;
        bus.status = status;
        Ok(bus.clone())
    }

    async fn set_status(&self, id: i64, status: BusStatus) -> Result<BusLocation, StoreError> {
        let mut state = self.state.write().await;

        let bus = state.buses.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if status == BusStatus::Active && bus.driver_id.is_none() {
            return Err(StoreError::UnassignedActive(id));
        }
        bus.status = status;
        Ok(bus.clone())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn list_users_by_role(&self, role: UserRole) -> Result<Vec<User>, StoreError> {
        let state = self.state.read().await;

        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|u| u.role == role)
            .cloned()
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));

        Ok(users)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut state = self.state.write().await;

        let taken = state
            .users
            .values()
            .any(|u| u.username == user.username || u.email == user.email);
        if taken {
            return Err(StoreError::DuplicateUser(user.username));
        }

        state.last_user_id += 1;
        let created = User {
            id: state.last_user_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        state.users.insert(created.id, created.clone());

        Ok(created)
    }
}
