//! Sistema de manejo de errores
//!
//! Este módulo define los tipos de resultado del coordinador de clientes
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Resultados de negocio del coordinador de clientes.
///
/// Los fallos del cache nunca aparecen aquí: se degradan dentro del
/// coordinador. Todo lo que llega como `CustomerError` cambia el resultado
/// de la operación y el llamador debe distinguirlo.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CustomerError {
    #[error("Customer '{0}' not found")]
    NotFound(String),

    #[error("Customer with identifier '{0}' already exists")]
    DuplicateIdentifier(String),

    #[error("Unknown customer variant '{0}'")]
    InvalidVariant(String),

    #[error("Invalid {variant} identifier '{identifier}'")]
    InvalidIdentifier { variant: String, identifier: String },

    #[error("Store failure: {0}")]
    StoreFailure(String),
}

pub type CustomerResult<T> = Result<T, CustomerError>;

/// Errores principales de la aplicación (frontera HTTP)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Customer(#[from] CustomerError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("JWT error: {0}")]
    Jwt(String),
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

impl ErrorResponse {
    fn new(error: &str, message: String, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message,
            details: None,
            code: Some(code.to_string()),
        }
    }
}

fn customer_error_response(err: CustomerError) -> (StatusCode, ErrorResponse) {
    let message = err.to_string();
    match err {
        CustomerError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            ErrorResponse::new("Not Found", message, "NOT_FOUND"),
        ),
        CustomerError::DuplicateIdentifier(_) => (
            StatusCode::CONFLICT,
            ErrorResponse::new("Conflict", message, "CONFLICT"),
        ),
        CustomerError::InvalidVariant(_) => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("Bad Request", message, "INVALID_VARIANT"),
        ),
        CustomerError::InvalidIdentifier { .. } => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("Bad Request", message, "INVALID_IDENTIFIER"),
        ),
        CustomerError::StoreFailure(msg) => {
            error!("❌ Fallo del store persistente: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "Store Failure".to_string(),
                    message: "An error occurred while accessing the customer store".to_string(),
                    details: Some(json!({ "store_error": msg })),
                    code: Some("STORE_FAILURE".to_string()),
                },
            )
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::Customer(err) => customer_error_response(err),

            AppError::Validation(e) => {
                warn!("⚠️ Error de validación: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "Validation Error".to_string(),
                        message: "The provided data is invalid".to_string(),
                        details: Some(json!(e)),
                        code: Some("VALIDATION_ERROR".to_string()),
                    },
                )
            }

            AppError::Unauthorized(msg) => {
                warn!("🔒 Acceso no autorizado: {}", msg);
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorResponse::new("Unauthorized", msg, "UNAUTHORIZED"),
                )
            }

            AppError::Forbidden(msg) => {
                warn!("🔒 Acceso prohibido: {}", msg);
                (
                    StatusCode::FORBIDDEN,
                    ErrorResponse::new("Forbidden", msg, "FORBIDDEN"),
                )
            }

            AppError::Internal(msg) => {
                error!("❌ Error interno: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Internal Server Error".to_string(),
                        message: "An unexpected error occurred".to_string(),
                        details: Some(json!({ "internal_error": msg })),
                        code: Some("INTERNAL_ERROR".to_string()),
                    },
                )
            }

            AppError::ServiceUnavailable(msg) => {
                warn!("⚠️ Servicio no disponible: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorResponse::new("Service Unavailable", msg, "SERVICE_UNAVAILABLE"),
                )
            }

            AppError::Jwt(msg) => {
                warn!("🔒 Error JWT: {}", msg);
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorResponse::new("JWT Error", msg, "JWT_ERROR"),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para handlers HTTP
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_customer_errors_map_to_distinct_statuses() {
        assert_eq!(
            status_of(CustomerError::NotFound("12345678".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CustomerError::DuplicateIdentifier("12345678".into()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(CustomerError::InvalidVariant("VIP".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CustomerError::StoreFailure("connection reset".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_errors_are_unauthorized_or_forbidden() {
        assert_eq!(status_of(AppError::Jwt("expired".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AppError::Forbidden("admin only".into())), StatusCode::FORBIDDEN);
    }
}
