use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::{BusLocationStore, StoreError};
use crate::models::bus::{BusLocation, BusStatus, FleetEntry};

const BUS_COLUMNS: &str =
    "id, bus_tag, route, latitude, longitude, last_update, status, driver_id";

pub struct PgBusRepository {
    pool: PgPool,
}

impl PgBusRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Tras un UPDATE condicionado que no afectó filas: ¿no existe o no es suyo?
    async fn ownership_failure(&self, id: i64, driver_id: i64) -> StoreError {
        match self.find_by_id(id).await {
            Ok(Some(_)) => StoreError::NotAssigned { bus_id: id, driver_id },
            Ok(None) => StoreError::NotFound(id),
            Err(e) => e,
        }
    }
}

#[async_trait]
impl BusLocationStore for PgBusRepository {
    async fn upsert_by_tag(
        &self,
        bus_tag: &str,
        route: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<BusLocation, StoreError> {
        let bus = sqlx::query_as::<_, BusLocation>(&format!(
            r#"
            INSERT INTO bus_locations (bus_tag, route, latitude, longitude, last_update, status)
            VALUES ($1, $2, $3, $4, now(), 'inactive')
            ON CONFLICT (bus_tag) DO UPDATE
            SET route = EXCLUDED.route,
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                last_update = EXCLUDED.last_update
            RETURNING {BUS_COLUMNS}
            "#
        ))
        .bind(bus_tag)
        .bind(route)
        .bind(latitude)
        .bind(longitude)
        .fetch_one(&self.pool)
        .await?;

        debug!("💾 Upsert bus {} (id {})", bus.bus_tag, bus.id);
        Ok(bus)
    }

    async fn assign(
        &self,
        bus_tag: &str,
        route: &str,
        driver_id: i64,
        default_position: (f64, f64),
    ) -> Result<BusLocation, StoreError> {
        let (latitude, longitude) = default_position;

        // El rol del conductor se comprueba en la misma sentencia que escribe
        let bus = sqlx::query_as::<_, BusLocation>(&format!(
            r#"
            WITH driver AS (
                SELECT id FROM users WHERE id = $3 AND role = 'driver'
            )
            INSERT INTO bus_locations
                (bus_tag, route, latitude, longitude, last_update, status, driver_id)
            SELECT $1, $2, $4, $5, now(), 'inactive', driver.id FROM driver
            ON CONFLICT (bus_tag) DO UPDATE
            SET route = EXCLUDED.route,
                driver_id = EXCLUDED.driver_id
            RETURNING {BUS_COLUMNS}
            "#
        ))
        .bind(bus_tag)
        .bind(route)
        .bind(driver_id)
        .bind(latitude)
        .bind(longitude)
        .fetch_optional(&self.pool)
        .await?;

        bus.ok_or(StoreError::NotADriver(driver_id))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<BusLocation>, StoreError> {
        let bus = sqlx::query_as::<_, BusLocation>(&format!(
            "SELECT {BUS_COLUMNS} FROM bus_locations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(bus)
    }

    async fn list_fleet(&self) -> Result<Vec<FleetEntry>, StoreError> {
        let fleet = sqlx::query_as::<_, FleetEntry>(
            r#"
            SELECT b.id, b.bus_tag, b.route, b.latitude, b.longitude, b.last_update,
                   b.status, b.driver_id, u.username AS driver_username
            FROM bus_locations b
            LEFT JOIN users u ON u.id = b.driver_id
            ORDER BY b.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(fleet)
    }

    async fn list_by_driver(&self, driver_id: i64) -> Result<Vec<BusLocation>, StoreError> {
        let buses = sqlx::query_as::<_, BusLocation>(&format!(
            "SELECT {BUS_COLUMNS} FROM bus_locations WHERE driver_id = $1 ORDER BY bus_tag"
        ))
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(buses)
    }

    async fn update_position(
        &self,
        id: i64,
        driver_id: i64,
        latitude: f64,
        longitude: f64,
    ) -> Result<BusLocation, StoreError> {
        let bus = sqlx::query_as::<_, BusLocation>(&format!(
            r#"
            UPDATE bus_locations
            SET latitude = $3, longitude = $4, last_update = now()
            WHERE id = $1 AND driver_id = $2
            RETURNING {BUS_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(driver_id)
        .bind(latitude)
        .bind(longitude)
        .fetch_optional(&self.pool)
        .await?;

        match bus {
            Some(bus) => Ok(bus),
            None => Err(self.ownership_failure(id, driver_id).await),
        }
    }

    async fn set_status_by_driver(
        &self,
        id: i64,
        driver_id: i64,
        status: BusStatus,
    ) -> Result<BusLocation, StoreError> {
        let bus = sqlx::query_as::<_, BusLocation>(&format!(
            r#"
            UPDATE bus_locations
            SET status = $3
            WHERE id = $1 AND driver_id = $2
            RETURNING {BUS_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(driver_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        match bus {
            Some(bus) => Ok(bus),
            None => Err(self.ownership_failure(id, driver_id).await),
        }
    }

    async fn set_status(&self, id: i64, status: BusStatus) -> Result<BusLocation, StoreError> {
        let bus = sqlx::query_as::<_, BusLocation>(&format!(
            r#"
            UPDATE bus_locations
            SET status = $2
            WHERE id = $1 AND ($2 <> 'active'::bus_status OR driver_id IS NOT NULL)
            RETURNING {BUS_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        match bus {
            Some(bus) => Ok(bus),
            None => match self.find_by_id(id).await? {
                Some(_) => Err(StoreError::UnassignedActive(id)),
                None => Err(StoreError::NotFound(id)),
            },
        }
    }
}
