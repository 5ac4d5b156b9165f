//! Modelo de BusLocation
//!
//! Un registro por bus físico con su última posición conocida, su estado
//! y el conductor asignado. Mapea a la tabla `bus_locations`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::fmt;

/// Estado del bus - mapea al ENUM bus_status
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "bus_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BusStatus {
    #[default]
    Inactive,
    Active,
    Maintenance,
}

impl BusStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BusStatus::Inactive => "inactive",
            BusStatus::Active => "active",
            BusStatus::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for BusStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct BusLocation {
    pub id: i64,
    pub bus_tag: String,
    pub route: String,
    pub latitude: f64,
    pub longitude: f64,
    pub last_update: DateTime<Utc>,
    pub status: BusStatus,
    pub driver_id: Option<i64>,
}

impl BusLocation {
    pub fn is_assigned_to(&self, driver_id: i64) -> bool {
        self.driver_id == Some(driver_id)
    }
}

/// Fila de la vista de flota: el bus más el nombre de su conductor (LEFT JOIN)
#[derive(Debug, Clone, FromRow)]
pub struct FleetEntry {
    #[sqlx(flatten)]
    pub bus: BusLocation,
    pub driver_username: Option<String>,
}
