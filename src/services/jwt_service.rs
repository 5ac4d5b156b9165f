use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::config::environment::EnvironmentConfig;
use crate::models::auth::{JwtClaims, UserRole};
use crate::models::user::User;
use crate::utils::errors::AppError;

/// Configuración JWT
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub access_token_duration: Duration,
}

impl From<&EnvironmentConfig> for JwtConfig {
    fn from(config: &EnvironmentConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            algorithm: Algorithm::HS256,
            access_token_duration: Duration::seconds(config.jwt_expiration as i64),
        }
    }
}

/// Token emitido en el login
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: chrono::DateTime<Utc>,
}

/// Servicio JWT
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_ref());
        let decoding_key = DecodingKey::from_secret(config.secret.as_ref());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Genera un token de acceso para el usuario
    pub fn generate_access_token(&self, user: &User) -> Result<IssuedToken, AppError> {
        let now = Utc::now();
        let expires_at = now + self.config.access_token_duration;

        let claims = JwtClaims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role.as_str().to_string(),
            jti: Uuid::new_v4().to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(self.config.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AppError::Jwt(format!("Error generating access token: {}", e)))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Valida y decodifica un token
    pub fn validate_token(&self, token: &str) -> Result<JwtClaims, AppError> {
        let validation = Validation::new(self.config.algorithm);

        decode::<JwtClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Jwt(format!("Invalid token: {}", e)))
    }

    /// Extrae el id de usuario y el rol declarados en el token
    pub fn identity(&self, token: &str) -> Result<(i64, UserRole), AppError> {
        let claims = self.validate_token(token)?;
        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::Jwt("Invalid subject in token".to_string()))?;
        let role = UserRole::from_str(&claims.role)
            .ok_or_else(|| AppError::Jwt("Invalid role in token".to_string()))?;
        Ok((user_id, role))
    }
}

/// Extraer token del header Authorization
pub fn extract_token_from_header(auth_header: &str) -> Result<&str, AppError> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| {
            AppError::Unauthorized("Authorization header must start with 'Bearer '".to_string())
        })?
        .trim();

    if token.is_empty() {
        return Err(AppError::Unauthorized("Token cannot be empty".to_string()));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver() -> User {
        User {
            id: 7,
            username: "driver1".to_string(),
            email: "driver1@example.com".to_string(),
            password_hash: String::new(),
            role: UserRole::Driver,
            created_at: Utc::now(),
        }
    }

    fn service(secret: &str) -> JwtService {
        let config = EnvironmentConfig {
            jwt_secret: secret.to_string(),
            ..EnvironmentConfig::default()
        };
        JwtService::new(JwtConfig::from(&config))
    }

    #[test]
    fn test_generate_and_validate_token() {
        let jwt_service = service("test-secret");

        let issued = jwt_service.generate_access_token(&driver()).unwrap();
        assert!(!issued.token.is_empty());
        assert!(issued.expires_at > Utc::now());

        let claims = jwt_service.validate_token(&issued.token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.username, "driver1");
        assert_eq!(claims.role, "driver");

        assert_eq!(jwt_service.identity(&issued.token).unwrap(), (7, UserRole::Driver));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let issued = service("secret-a").generate_access_token(&driver()).unwrap();
        assert!(matches!(service("secret-b").validate_token(&issued.token), Err(AppError::Jwt(_))));
    }

    #[test]
    fn test_extract_token_from_header() {
        assert_eq!(extract_token_from_header("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
        assert!(extract_token_from_header("Basic abc").is_err());
        assert!(extract_token_from_header("Bearer ").is_err());
    }
}
