//! Sistema de manejo de errores
//!
//! Este módulo define los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::repositories::StoreError;

/// Motivo legible por máquina de un error de entrada de coordenadas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputErrorKind {
    MissingField,
    BadValue,
    OutOfRange,
}

impl InputErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            InputErrorKind::MissingField => "MISSING_FIELD",
            InputErrorKind::BadValue => "BAD_VALUE",
            InputErrorKind::OutOfRange => "OUT_OF_RANGE",
        }
    }
}

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{message}")]
    Input {
        kind: InputErrorKind,
        message: String,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {message}")]
    Forbidden { code: &'static str, message: String },

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("Hash error: {0}")]
    Hash(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl AppError {
    pub fn missing_field(message: impl Into<String>) -> Self {
        AppError::Input { kind: InputErrorKind::MissingField, message: message.into() }
    }

    pub fn bad_value(message: impl Into<String>) -> Self {
        AppError::Input { kind: InputErrorKind::BadValue, message: message.into() }
    }

    pub fn out_of_range(message: impl Into<String>) -> Self {
        AppError::Input { kind: InputErrorKind::OutOfRange, message: message.into() }
    }

    pub fn forbidden(code: &'static str, message: impl Into<String>) -> Self {
        AppError::Forbidden { code, message: message.into() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Store(e) => match e {
                StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                StoreError::NotAssigned { .. } => StatusCode::FORBIDDEN,
                StoreError::NotADriver(_) => StatusCode::BAD_REQUEST,
                StoreError::UnassignedActive(_) | StoreError::DuplicateUser(_) => {
                    StatusCode::CONFLICT
                }
                StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Validation(_) | AppError::Input { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) | AppError::Hash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Código estable que acompaña a cada error en el cuerpo de la respuesta
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Store(e) => match e {
                StoreError::NotFound(_) => "NOT_FOUND",
                StoreError::NotAssigned { .. } => "NOT_ASSIGNED",
                StoreError::NotADriver(_) => "NOT_A_DRIVER",
                StoreError::UnassignedActive(_) => "UNASSIGNED_ACTIVE",
                StoreError::DuplicateUser(_) => "DUPLICATE_USER",
                StoreError::Database(_) => "STORAGE_ERROR",
            },
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Input { kind, .. } => kind.code(),
            AppError::Unauthorized(_) => "UNAUTHENTICATED",
            AppError::Jwt(_) => "JWT_ERROR",
            AppError::Forbidden { code, .. } => *code,
            AppError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            AppError::Internal(_) => "INTERNAL_ERROR",
            AppError::Hash(_) => "HASH_ERROR",
        }
    }

    /// Mensaje seguro para el cliente
    pub fn client_message(&self) -> String {
        match self {
            AppError::Store(StoreError::Database(_)) => {
                "An error occurred while accessing the location store".to_string()
            }
            AppError::Store(e) => e.to_string(),
            AppError::Validation(_) => "The provided data is invalid".to_string(),
            AppError::Input { message, .. } => message.clone(),
            AppError::Unauthorized(msg) | AppError::Jwt(msg) => msg.clone(),
            AppError::Forbidden { message, .. } => message.clone(),
            AppError::RateLimitExceeded => "Too many requests. Please try again later".to_string(),
            AppError::Internal(_) => "An unexpected error occurred".to_string(),
            AppError::Hash(_) => "An error occurred while processing credentials".to_string(),
        }
    }

    pub fn log(&self) {
        let status = self.status_code();
        if status.is_server_error() {
            error!("❌ {} ({})", self, self.code());
        } else {
            warn!("⚠️ {} ({})", self, self.code());
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status_code();
        let error = status.canonical_reason().unwrap_or("Error").to_string();
        let details = match &self {
            AppError::Validation(e) => Some(json!(e)),
            AppError::Internal(msg) => Some(json!({ "internal_error": msg })),
            _ => None,
        };

        let body = ErrorResponse {
            error,
            message: self.client_message(),
            details,
            code: Some(self.code().to_string()),
        };

        (status, Json(body)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;
