//! Repositorios
//!
//! Acceso a datos de buses y usuarios. Cada repositorio es un trait con dos
//! implementaciones: PostgreSQL (`sqlx`) y memoria (desarrollo y tests).
//!
//! Todas las escrituras sobre un bus son una sola sentencia (o una sola
//! sección crítica en memoria), así que las escrituras a una misma fila
//! quedan linealizadas. Dos envíos de posición concurrentes al mismo bus
//! se resuelven por última escritura.

pub mod bus_repository;
pub mod memory;
pub mod user_repository;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::auth::UserRole;
use crate::models::bus::{BusLocation, BusStatus, FleetEntry};
use crate::models::user::{NewUser, User};

pub use bus_repository::PgBusRepository;
pub use memory::MemoryStore;
pub use user_repository::PgUserRepository;

/// Errores del almacén de ubicaciones y usuarios
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Bus {0} not found")]
    NotFound(i64),

    #[error("Bus {bus_id} is not assigned to driver {driver_id}")]
    NotAssigned { bus_id: i64, driver_id: i64 },

    #[error("User {0} is not a driver")]
    NotADriver(i64),

    #[error("Bus {0} cannot be active without an assigned driver")]
    UnassignedActive(i64),

    #[error("Username '{0}' already exists")]
    DuplicateUser(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Almacén de ubicaciones: una fila por bus físico
#[async_trait]
pub trait BusLocationStore: Send + Sync {
    /// Crear o actualizar (ruta, posición, timestamp) por etiqueta.
    /// Un bus nuevo nace `inactive` y sin conductor.
    async fn upsert_by_tag(
        &self,
        bus_tag: &str,
        route: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<BusLocation, StoreError>;

    /// Asignar un conductor a la etiqueta. Si el bus existe sólo cambian
    /// ruta y conductor; si no, se crea en `default_position` e `inactive`.
    async fn assign(
        &self,
        bus_tag: &str,
        route: &str,
        driver_id: i64,
        default_position: (f64, f64),
    ) -> Result<BusLocation, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<BusLocation>, StoreError>;

    /// Vista completa de la flota con el nombre del conductor, en una sola lectura
    async fn list_fleet(&self) -> Result<Vec<FleetEntry>, StoreError>;

    async fn list_by_driver(&self, driver_id: i64) -> Result<Vec<BusLocation>, StoreError>;

    /// Nueva posición, sólo si el bus está asignado a `driver_id`.
    /// No toca ni estado ni conductor.
    async fn update_position(
        &self,
        id: i64,
        driver_id: i64,
        latitude: f64,
        longitude: f64,
    ) -> Result<BusLocation, StoreError>;

    /// Cambio de estado hecho por el conductor asignado
    async fn set_status_by_driver(
        &self,
        id: i64,
        driver_id: i64,
        status: BusStatus,
    ) -> Result<BusLocation, StoreError>;

    /// Cambio de estado administrativo. `active` exige conductor asignado.
    async fn set_status(&self, id: i64, status: BusStatus) -> Result<BusLocation, StoreError>;
}

/// Almacén de usuarios (colaborador externo, sólo lo que necesita el seguimiento)
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Usuarios con un rol dado, ordenados por nombre
    async fn list_users_by_role(&self, role: UserRole) -> Result<Vec<User>, StoreError>;

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
}
