//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

/// Punto de referencia del campus (coordenadas por defecto de un bus recién asignado)
pub const DEFAULT_CAMPUS_LAT: f64 = 6.67233;
pub const DEFAULT_CAMPUS_LON: f64 = -1.56927;

const DEV_JWT_SECRET: &str = "campus-bus-tracking-dev-secret-change-me";

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    pub rate_limit_requests: u32,
    pub rate_limit_window: u64,
    pub request_timeout_secs: u64,
    pub default_campus_lat: f64,
    pub default_campus_lon: f64,
    pub enforce_coordinate_bounds: bool,
    pub seed_demo_users: bool,
}

impl Default for EnvironmentConfig {
    /// Valores de desarrollo, sin base de datos
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            database_url: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_expiration: 86_400,
            cors_origins: Vec::new(),
            rate_limit_requests: 120,
            rate_limit_window: 60,
            request_timeout_secs: 30,
            default_campus_lat: DEFAULT_CAMPUS_LAT,
            default_campus_lon: DEFAULT_CAMPUS_LON,
            enforce_coordinate_bounds: true,
            seed_demo_users: true,
        }
    }
}

impl EnvironmentConfig {
    /// Cargar la configuración desde variables de entorno
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let environment = env::var("ENVIRONMENT").unwrap_or(defaults.environment);
        let is_production = environment == "production";

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if is_production => bail!("JWT_SECRET must be set in production"),
            _ => {
                warn!("⚠️ JWT_SECRET no definido, usando secreto de desarrollo");
                defaults.jwt_secret
            }
        };

        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            port: load_or("PORT", defaults.port)?,
            host: env::var("HOST").unwrap_or(defaults.host),
            jwt_secret,
            jwt_expiration: load_or("JWT_EXPIRATION", defaults.jwt_expiration)?,
            cors_origins,
            rate_limit_requests: load_or("RATE_LIMIT_REQUESTS", defaults.rate_limit_requests)?,
            rate_limit_window: load_or("RATE_LIMIT_WINDOW", defaults.rate_limit_window)?,
            request_timeout_secs: load_or("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?,
            default_campus_lat: load_or("DEFAULT_CAMPUS_LAT", defaults.default_campus_lat)?,
            default_campus_lon: load_or("DEFAULT_CAMPUS_LON", defaults.default_campus_lon)?,
            enforce_coordinate_bounds: load_or(
                "ENFORCE_COORDINATE_BOUNDS",
                defaults.enforce_coordinate_bounds,
            )?,
            seed_demo_users: load_or(
                "SEED_DEMO_USERS",
                default_seed(is_production, database_url.is_some()),
            )?,
            database_url,
            environment,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Coordenadas por defecto `(lat, lon)` para buses nuevos
    pub fn default_campus_position(&self) -> (f64, f64) {
        (self.default_campus_lat, self.default_campus_lon)
    }
}

/// Las cuentas de demostración sólo se crean solas sobre el almacén en memoria
fn default_seed(is_production: bool, has_database: bool) -> bool {
    !is_production && !has_database
}

fn load_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr + Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        Err(_) => {
            info!("{} no definido, usando valor por defecto: {}", key, default);
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_development() {
        let config = EnvironmentConfig::default();
        assert!(config.is_development());
        assert!(!config.is_production());
        assert!(config.database_url.is_none());
        assert_eq!(config.server_url(), "0.0.0.0:3000");
        assert_eq!(config.default_campus_position(), (6.67233, -1.56927));
    }

    #[test]
    fn test_demo_seed_defaults_to_memory_store_only() {
        assert!(default_seed(false, false));
        assert!(!default_seed(false, true));
        assert!(!default_seed(true, false));
        assert!(!default_seed(true, true));
    }
}
