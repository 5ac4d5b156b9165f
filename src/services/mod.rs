//! Services module
//!
//! Lógica de negocio que no pertenece a un solo controlador:
//! autenticación, tokens, permisos por rol y datos de demostración.

pub mod auth_service;
pub mod authorization_service;
pub mod jwt_service;
pub mod seed_service;

pub use auth_service::AuthService;
pub use authorization_service::AuthorizationService;
pub use jwt_service::JwtService;
