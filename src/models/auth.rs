use serde::{Deserialize, Serialize};
use std::fmt;

/// Roles del sistema - mapea al ENUM user_role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Editor,
    Driver,
    Student,
}

/// Capacidades que cada endpoint exige
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Asignar conductores, editar buses, pasar a mantenimiento
    ManageFleet,
    /// Enviar posiciones y arrancar/parar el seguimiento de sus buses
    ReportPosition,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Editor => "editor",
            UserRole::Driver => "driver",
            UserRole::Student => "student",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(UserRole::Admin),
            "editor" => Some(UserRole::Editor),
            "driver" => Some(UserRole::Driver),
            "student" => Some(UserRole::Student),
            _ => None,
        }
    }

    /// Capacidades concedidas a cada rol
    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            UserRole::Admin => &[Capability::ManageFleet],
            UserRole::Driver => &[Capability::ReportPosition],
            UserRole::Editor | UserRole::Student => &[],
        }
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims del JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String, // user_id
    pub username: String,
    pub role: String,
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
}
