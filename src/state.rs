//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use sqlx::PgPool;
use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::middleware::rate_limit::RateLimitState;
use crate::repositories::{
    BusLocationStore, MemoryStore, PgBusRepository, PgUserRepository, UserStore,
};
use crate::services::jwt_service::{JwtConfig, JwtService};

/// Backend de almacenamiento en uso
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Postgres => "postgres",
            StoreBackend::Memory => "memory",
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EnvironmentConfig>,
    pub buses: Arc<dyn BusLocationStore>,
    pub users: Arc<dyn UserStore>,
    pub jwt: Arc<JwtService>,
    pub rate_limit: RateLimitState,
    pub backend: StoreBackend,
}

impl AppState {
    fn build(
        config: EnvironmentConfig,
        buses: Arc<dyn BusLocationStore>,
        users: Arc<dyn UserStore>,
        backend: StoreBackend,
    ) -> Self {
        let jwt = Arc::new(JwtService::new(JwtConfig::from(&config)));
        let rate_limit = RateLimitState::from_config(&config);

        Self {
            config: Arc::new(config),
            buses,
            users,
            jwt,
            rate_limit,
            backend,
        }
    }

    /// Estado respaldado por PostgreSQL
    pub fn with_pool(config: EnvironmentConfig, pool: PgPool) -> Self {
        Self::build(
            config,
            Arc::new(PgBusRepository::new(pool.clone())),
            Arc::new(PgUserRepository::new(pool)),
            StoreBackend::Postgres,
        )
    }

    /// Estado respaldado por el almacén en memoria
    pub fn with_memory_store(config: EnvironmentConfig, store: MemoryStore) -> Self {
        Self::build(
            config,
            Arc::new(store.clone()),
            Arc::new(store),
            StoreBackend::Memory,
        )
    }
}
