//! Middleware de autenticación JWT
//!
//! Este módulo maneja la autenticación JWT, extracción de tokens
//! y verificación de usuarios autenticados.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::{
    models::{auth::UserRole, user::User},
    services::jwt_service::extract_token_from_header,
    state::AppState,
    utils::errors::AppError,
};

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub username: String,
    pub role: UserRole,
}

impl From<User> for AuthenticatedUser {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

/// Resolver el usuario de un header `Authorization: Bearer <token>`.
///
/// El rol se vuelve a leer del almacén de usuarios en cada request: un
/// cambio de rol o un usuario borrado surte efecto sin esperar a que
/// caduque el token.
pub async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<AuthenticatedUser, AppError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Authorization token required".to_string()))?;

    let token = extract_token_from_header(auth_header)?;
    let (user_id, token_role) = state.jwt.identity(token)?;

    let user = state
        .users
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    if user.role != token_role {
        debug!("🔄 Rol de {} cambió ({} -> {})", user.username, token_role, user.role);
    }

    Ok(AuthenticatedUser::from(user))
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(&state, request.headers()).await?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
