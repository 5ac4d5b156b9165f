//! Middleware de Rate Limiting
//!
//! Limita los envíos de posición por conductor: un teléfono con el GPS
//! atascado no debe saturar el almacén de ubicaciones. El endpoint de
//! ingesta lo consulta directamente para responder con su propio sobre.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

use crate::config::EnvironmentConfig;
use crate::middleware::auth::AuthenticatedUser;
use crate::utils::errors::AppError;

/// Ventana fija de requests por cliente
#[derive(Debug, Clone)]
struct RateLimitInfo {
    requests: u32,
    window_start: Instant,
}

/// Estado global del rate limiting
#[derive(Clone)]
pub struct RateLimitState {
    requests: Arc<Mutex<HashMap<String, RateLimitInfo>>>,
    max_requests: u32,
    window_duration: Duration,
}

impl RateLimitState {
    pub fn new(max_requests: u32, window_duration: Duration) -> Self {
        Self {
            requests: Arc::new(Mutex::new(HashMap::new())),
            max_requests,
            window_duration,
        }
    }

    pub fn from_config(config: &EnvironmentConfig) -> Self {
        Self::new(
            config.rate_limit_requests,
            Duration::from_secs(config.rate_limit_window),
        )
    }

    /// Registrar una request de `key`; error si ya agotó la ventana
    pub async fn check_rate_limit(&self, key: &str) -> Result<(), AppError> {
        let result = self.check_at(key, Instant::now()).await;
        if result.is_err() {
            warn!("🚦 Rate limit excedido para {}", key);
        }
        result
    }

    /// Límite por conductor autenticado
    pub async fn check_user(&self, user: &AuthenticatedUser) -> Result<(), AppError> {
        self.check_rate_limit(&format!("user:{}", user.user_id)).await
    }

    async fn check_at(&self, key: &str, now: Instant) -> Result<(), AppError> {
        let mut requests = self.requests.lock().await;

        // Limpiar entradas expiradas
        requests.retain(|_, info| now.duration_since(info.window_start) < self.window_duration);

        let info = requests.entry(key.to_string()).or_insert(RateLimitInfo {
            requests: 0,
            window_start: now,
        });

        if info.requests >= self.max_requests {
            return Err(AppError::RateLimitExceeded);
        }

        info.requests += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_limit_is_per_key() {
        let state = RateLimitState::new(2, Duration::from_secs(60));

        assert!(state.check_rate_limit("user:1").await.is_ok());
        assert!(state.check_rate_limit("user:1").await.is_ok());
        assert!(matches!(
            state.check_rate_limit("user:1").await,
            Err(AppError::RateLimitExceeded)
        ));
        assert!(state.check_rate_limit("user:2").await.is_ok());
    }

    #[tokio::test]
    async fn test_check_user_keys_by_user_id() {
        let state = RateLimitState::new(1, Duration::from_secs(60));
        let driver = AuthenticatedUser {
            user_id: 7,
            username: "driver1".to_string(),
            role: crate::models::auth::UserRole::Driver,
        };

        assert!(state.check_user(&driver).await.is_ok());
        assert!(state.check_rate_limit("user:7").await.is_err());
    }

    #[tokio::test]
    async fn test_window_resets() {
        let state = RateLimitState::new(1, Duration::from_secs(10));
        let start = Instant::now();

        assert!(state.check_at("ip:10.0.0.1", start).await.is_ok());
        assert!(state.check_at("ip:10.0.0.1", start + Duration::from_secs(5)).await.is_err());
        assert!(state.check_at("ip:10.0.0.1", start + Duration::from_secs(11)).await.is_ok());
    }
}
