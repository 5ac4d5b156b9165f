use crate::middleware::auth::AuthenticatedUser;
use crate::models::auth::Capability;
use crate::utils::errors::AppError;

/// Servicio de autorización: comprobación de capacidades por endpoint
pub struct AuthorizationService;

impl AuthorizationService {
    /// Verifica si un usuario tiene una capacidad
    pub fn has_capability(user: &AuthenticatedUser, capability: Capability) -> bool {
        user.role.has_capability(capability)
    }

    /// Exige una capacidad o devuelve un error de permisos (403)
    pub fn require(user: &AuthenticatedUser, capability: Capability) -> Result<(), AppError> {
        if Self::has_capability(user, capability) {
            return Ok(());
        }

        let message = match capability {
            Capability::ManageFleet => "Administrator role required",
            Capability::ReportPosition => "Unauthorized",
        };
        Err(AppError::forbidden("UNAUTHORIZED", message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::UserRole;

    fn user(user_id: i64, role: UserRole) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id,
            username: format!("user{user_id}"),
            role,
        }
    }

    #[test]
    fn test_require_capability() {
        let require = AuthorizationService::require;

        assert!(require(&user(1, UserRole::Admin), Capability::ManageFleet).is_ok());
        assert!(require(&user(2, UserRole::Driver), Capability::ReportPosition).is_ok());

        let err = require(&user(3, UserRole::Editor), Capability::ManageFleet).unwrap_err();
        assert!(matches!(err, AppError::Forbidden { code: "UNAUTHORIZED", .. }));

        assert!(require(&user(4, UserRole::Student), Capability::ReportPosition).is_err());
        assert!(require(&user(5, UserRole::Admin), Capability::ReportPosition).is_err());
    }
}
