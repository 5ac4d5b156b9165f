use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::bus::{BusLocation, BusStatus, FleetEntry};
use crate::models::user::User;
use crate::utils::validation::{validate_bus_tag, validate_not_empty};

// Request del admin para editar directamente un bus (crea si no existe)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBusRequest {
    #[validate(custom = "validate_bus_tag")]
    pub bus_tag: String,

    #[validate(length(min = 1, max = 100), custom = "validate_not_empty")]
    pub route: String,

    pub latitude: f64,
    pub longitude: f64,
}

// Request del admin para asignar un conductor a un bus
#[derive(Debug, Deserialize, Validate)]
pub struct AssignBusRequest {
    #[validate(custom = "validate_bus_tag")]
    pub bus_tag: String,

    #[validate(length(min = 1, max = 100), custom = "validate_not_empty")]
    pub route: String,

    pub driver_id: i64,
}

// Cambio de estado administrativo (mantenimiento)
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: BusStatus,
}

// Response de bus completo
#[derive(Debug, Serialize, Deserialize)]
pub struct BusResponse {
    pub id: i64,
    pub bus_tag: String,
    pub route: String,
    pub latitude: f64,
    pub longitude: f64,
    pub last_update: DateTime<Utc>,
    pub status: BusStatus,
    pub driver_id: Option<i64>,
}

impl From<BusLocation> for BusResponse {
    fn from(bus: BusLocation) -> Self {
        Self {
            id: bus.id,
            bus_tag: bus.bus_tag,
            route: bus.route,
            latitude: bus.latitude,
            longitude: bus.longitude,
            last_update: bus.last_update,
            status: bus.status,
            driver_id: bus.driver_id,
        }
    }
}

/// Entrada del mapa público. `position` va en orden [lon, lat].
#[derive(Debug, Serialize, Deserialize)]
pub struct FleetBusResponse {
    pub id: String,
    pub route: String,
    pub position: [f64; 2],
    #[serde(rename = "lastUpdate")]
    pub last_update: String,
    pub status: BusStatus,
    pub driver: Option<String>,
}

impl From<FleetEntry> for FleetBusResponse {
    fn from(entry: FleetEntry) -> Self {
        let bus = entry.bus;
        Self {
            id: bus.bus_tag,
            route: bus.route,
            position: [bus.longitude, bus.latitude],
            last_update: bus.last_update.format("%H:%M:%S").to_string(),
            status: bus.status,
            driver: entry.driver_username,
        }
    }
}

// Conductor disponible para asignar
#[derive(Debug, Serialize, Deserialize)]
pub struct DriverResponse {
    pub id: i64,
    pub username: String,
}

impl From<User> for DriverResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

// Asignación actual de un bus (vista del admin)
#[derive(Debug, Serialize, Deserialize)]
pub struct AssignmentResponse {
    pub bus_id: i64,
    pub bus_tag: String,
    pub route: String,
    pub status: BusStatus,
    pub driver: Option<String>,
}

impl From<FleetEntry> for AssignmentResponse {
    fn from(entry: FleetEntry) -> Self {
        Self {
            bus_id: entry.bus.id,
            bus_tag: entry.bus.bus_tag,
            route: entry.bus.route,
            status: entry.bus.status,
            driver: entry.driver_username,
        }
    }
}

// Página de asignación: conductores elegibles + asignaciones actuales
#[derive(Debug, Serialize, Deserialize)]
pub struct AssignmentOverview {
    pub drivers: Vec<DriverResponse>,
    pub assignments: Vec<AssignmentResponse>,
}

// Acuse del endpoint de ingesta de posiciones
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LocationAck {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl LocationAck {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            code: None,
        }
    }

    pub fn failed(error: String, code: &str) -> Self {
        Self {
            success: false,
            error: Some(error),
            code: Some(code.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(driver: Option<&str>) -> FleetEntry {
        FleetEntry {
            bus: BusLocation {
                id: 3,
                bus_tag: "B12".to_string(),
                route: "Campus Loop".to_string(),
                latitude: 6.67233,
                longitude: -1.56927,
                last_update: Utc.with_ymd_and_hms(2025, 3, 14, 8, 5, 9).unwrap(),
                status: BusStatus::Active,
                driver_id: driver.map(|_| 7),
            },
            driver_username: driver.map(str::to_string),
        }
    }

    #[test]
    fn test_fleet_response_shape() {
        let json = serde_json::to_value(FleetBusResponse::from(entry(Some("driver1")))).unwrap();

        assert_eq!(json["id"], "B12");
        assert_eq!(json["route"], "Campus Loop");
        assert_eq!(json["position"][0], -1.56927);
        assert_eq!(json["position"][1], 6.67233);
        assert_eq!(json["lastUpdate"], "08:05:09");
        assert_eq!(json["status"], "active");
        assert_eq!(json["driver"], "driver1");
    }

    #[test]
    fn test_fleet_response_without_driver_is_null() {
        let json = serde_json::to_value(FleetBusResponse::from(entry(None))).unwrap();
        assert!(json["driver"].is_null());
    }

    #[test]
    fn test_update_bus_request_validation() {
        let valid = UpdateBusRequest {
            bus_tag: "B12".to_string(),
            route: "Campus Loop".to_string(),
            latitude: 6.7,
            longitude: -1.5,
        };
        assert!(valid.validate().is_ok());

        let invalid = UpdateBusRequest {
            bus_tag: "".to_string(),
            route: "   ".to_string(),
            latitude: 6.7,
            longitude: -1.5,
        };
        let errors = invalid.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("bus_tag"));
        assert!(errors.field_errors().contains_key("route"));
    }

    #[test]
    fn test_location_ack_serialization() {
        let ok = serde_json::to_value(LocationAck::ok()).unwrap();
        assert_eq!(ok, serde_json::json!({ "success": true }));

        let ack = LocationAck::failed("Missing coordinates".into(), "MISSING_FIELD");
        let failed = serde_json::to_value(ack).unwrap();
        assert_eq!(failed["success"], false);
        assert_eq!(failed["error"], "Missing coordinates");
        assert_eq!(failed["code"], "MISSING_FIELD");
    }
}
