//! Error handling - every failure leaves as `{"error": "..."}`.

use std::fmt;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use quill_core::DomainError;
use quill_core::ports::AuthError;
use quill_shared::ErrorResponse;

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg) => write!(f, "{msg}"),
            AppError::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "Internal error");
                ErrorResponse::internal_error()
            }
            other => ErrorResponse::new(other.to_string()),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, key } => {
                tracing::debug!(entity = entity_type, key = %key, "Lookup missed");
                AppError::NotFound(format!("{entity_type} not found"))
            }
            DomainError::Forbidden(msg) => AppError::Forbidden(msg),
            err @ (DomainError::Validation(_)
            | DomainError::PayloadTooLarge { .. }
            | DomainError::Persistence(_)
            | DomainError::Upload(_)) => AppError::BadRequest(err.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InsufficientPermissions => {
                AppError::Forbidden("Admin resource. Access denied".to_string())
            }
            AuthError::TokenExpired => AppError::Unauthorized("Token expired".to_string()),
            AuthError::MissingAuth => AppError::Unauthorized("Authentication required".to_string()),
            AuthError::InvalidToken(reason) => {
                tracing::debug!(reason = %reason, "Rejected bearer token");
                AppError::Unauthorized("Invalid token".to_string())
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
