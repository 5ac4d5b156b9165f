use validator::Validate;

use crate::dto::auth_dto::{LoginRequest, LoginResponse, UserInfo};
use crate::middleware::auth::AuthenticatedUser;
use crate::services::auth_service::AuthService;
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub struct AuthController {
    service: AuthService,
}

impl AuthController {
    pub fn new(state: &AppState) -> Self {
        Self {
            service: AuthService::new(state),
        }
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        request.validate()?;
        self.service.login(&request).await
    }

    /// Identidad resuelta por el middleware de autenticación
    pub fn me(&self, user: AuthenticatedUser) -> UserInfo {
        UserInfo::from(user)
    }
}
