// server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use partsdesk::{DeskError, FieldViolation, ValidationError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("{0}")]
  Validation(ValidationError),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Storage Unavailable: {0}")]
  StorageUnavailable(String),

  #[error("Service Not Configured: {0}")]
  NotConfigured(String),

  #[error("Bad Request: {0}")]
  BadRequest(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  pub fn validation(field: &str, message: impl Into<String>) -> Self {
    AppError::Validation(ValidationError::single(field, message))
  }
}

impl From<DeskError> for AppError {
  fn from(err: DeskError) -> Self {
    match err {
      DeskError::Validation(v) => AppError::Validation(v),
      e @ DeskError::NotFound { .. } => AppError::NotFound(e.to_string()),
      e @ DeskError::InvalidTransition { .. } => AppError::Conflict(e.to_string()),
      e @ DeskError::Storage { .. } => AppError::StorageUnavailable(e.to_string()),
      DeskError::NotConfigured(channel) => AppError::NotConfigured(channel),
      DeskError::Config(m) => AppError::Config(m),
      e => AppError::Internal(e.to_string()),
    }
  }
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<sqlx::Error>() {
      Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
      Err(other) => AppError::Internal(format!("{other:#}")),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) => StatusCode::CONFLICT,
      AppError::StorageUnavailable(_) | AppError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Rejecting request");
    }
    let body = match self {
      AppError::Validation(v) => {
        let fields: Vec<&FieldViolation> = v.violations.iter().collect();
        json!({"error": "Validation failed", "fields": fields})
      }
      AppError::Auth(m) | AppError::Forbidden(m) | AppError::NotFound(m) | AppError::Conflict(m) | AppError::BadRequest(m) => {
        json!({"error": m})
      }
      AppError::StorageUnavailable(m) => json!({"error": "Order store unavailable", "detail": m}),
      AppError::NotConfigured(m) => json!({"error": "Channel not configured", "detail": m}),
      AppError::Config(m) => json!({"error": "Configuration issue", "detail": m}),
      AppError::Sqlx(_) => json!({"error": "Database operation failed"}),
      AppError::Internal(m) => json!({"error": "An internal error occurred", "detail": m}),
    };
    HttpResponse::build(status).json(body)
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
