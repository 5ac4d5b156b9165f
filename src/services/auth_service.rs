use bcrypt::verify;
use std::sync::Arc;
use tracing::{info, warn};

use crate::dto::auth_dto::{LoginRequest, LoginResponse, UserInfo};
use crate::middleware::auth::AuthenticatedUser;
use crate::repositories::UserStore;
use crate::services::jwt_service::JwtService;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

/// Servicio de autenticación
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt: Arc<JwtService>,
}

impl AuthService {
    pub fn new(state: &AppState) -> Self {
        Self {
            users: state.users.clone(),
            jwt: state.jwt.clone(),
        }
    }

    /// Verifica credenciales y emite un token de acceso
    pub async fn login(&self, request: &LoginRequest) -> AppResult<LoginResponse> {
        let user = match self.users.find_user_by_username(&request.username).await? {
            Some(user) => user,
            None => {
                warn!("🔒 Login fallido: usuario {} desconocido", request.username);
                return Err(invalid_credentials());
            }
        };

        // bcrypt es costoso, fuera del executor
        let password = request.password.clone();
        let hash = user.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || verify(password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("Password check task failed: {}", e)))?
            .map_err(|e| AppError::Hash(e.to_string()))?;

        if !valid {
            warn!("🔒 Login fallido para {}", user.username);
            return Err(invalid_credentials());
        }

        let issued = self.jwt.generate_access_token(&user)?;
        info!("🔑 Login de {} ({})", user.username, user.role);

        Ok(LoginResponse {
            token: issued.token,
            token_type: "Bearer".to_string(),
            expires_at: issued.expires_at,
            user: UserInfo::from(AuthenticatedUser::from(user)),
        })
    }
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvironmentConfig;
    use crate::models::auth::UserRole;
    use crate::models::user::NewUser;
    use crate::repositories::MemoryStore;

    async fn service() -> (AuthService, AppState) {
        let store = MemoryStore::new();
        store
            .create_user(NewUser {
                username: "driver1".to_string(),
                email: "driver1@example.com".to_string(),
                password_hash: bcrypt::hash("driverpass1", 4).unwrap(),
                role: UserRole::Driver,
            })
            .await
            .unwrap();
        let state = AppState::with_memory_store(EnvironmentConfig::default(), store);
        (AuthService::new(&state), state)
    }

    fn credentials(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_issues_token_for_role() {
        let (service, state) = service().await;

        let response = service.login(&credentials("driver1", "driverpass1")).await.unwrap();

        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.user.role, UserRole::Driver);
        let (user_id, role) = state.jwt.identity(&response.token).unwrap();
        assert_eq!(user_id, response.user.id);
        assert_eq!(role, UserRole::Driver);
    }

    #[tokio::test]
    async fn test_login_rejects_bad_password_and_unknown_user() {
        let (service, _) = service().await;

        let err = service.login(&credentials("driver1", "nope")).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        let err = service.login(&credentials("ghost", "driverpass1")).await.unwrap_err();
        assert_eq!(err.client_message(), "Invalid credentials");
    }
}
