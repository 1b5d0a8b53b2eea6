// server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use tiffin_core::domain::DomainError;
use tiffin_core::{FlowError, LoginRefusal};

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Unauthorized: {0}")]
  Unauthorized(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Pending Approval: {0}")]
  PendingApproval(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Invalid Cart: {0}")]
  InvalidCart(String),

  #[error("Service Unavailable: {0}")]
  ServiceUnavailable(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(sqlx::Error),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  /// Stable machine-readable code sent in the error envelope.
  pub fn code(&self) -> &'static str {
    match self {
      AppError::Validation(_) => "VALIDATION_ERROR",
      AppError::Unauthorized(_) => "UNAUTHORIZED",
      AppError::Forbidden(_) => "FORBIDDEN",
      AppError::PendingApproval(_) => "PENDING_APPROVAL",
      AppError::NotFound(_) => "NOT_FOUND",
      AppError::Conflict(_) => "CONFLICT",
      AppError::InvalidCart(_) => "INVALID_CART",
      AppError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Workflow { .. } | AppError::Internal(_) => "INTERNAL_ERROR",
    }
  }

  /// The message the client sees. Internal details stay in the logs.
  fn public_message(&self) -> String {
    match self {
      AppError::Validation(m)
      | AppError::Unauthorized(m)
      | AppError::Forbidden(m)
      | AppError::PendingApproval(m)
      | AppError::NotFound(m)
      | AppError::Conflict(m)
      | AppError::InvalidCart(m)
      | AppError::ServiceUnavailable(m) => m.clone(),
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Workflow { .. } | AppError::Internal(_) => {
        "An internal error occurred.".to_string()
      }
    }
  }
}

impl From<sqlx::Error> for AppError {
  fn from(err: sqlx::Error) -> Self {
    match &err {
      sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
        AppError::Conflict("A record with the same unique value already exists.".to_string())
      }
      sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
        AppError::ServiceUnavailable("The database is temporarily unavailable, please retry.".to_string())
      }
      sqlx::Error::RowNotFound => AppError::NotFound("Record not found.".to_string()),
      _ => AppError::Sqlx(err),
    }
  }
}

impl From<sqlx::migrate::MigrateError> for AppError {
  fn from(err: sqlx::migrate::MigrateError) -> Self {
    AppError::Internal(format!("Migration failed: {}", err))
  }
}

impl From<DomainError> for AppError {
  fn from(err: DomainError) -> Self {
    match err {
      DomainError::IllegalTransition { .. } => AppError::Conflict(err.to_string()),
      DomainError::TransitionNotPermitted { .. } => AppError::Forbidden(err.to_string()),
      DomainError::MixedRestaurants { .. } => AppError::InvalidCart(
        "All items in the cart must come from the same restaurant. Clear the cart to order elsewhere.".to_string(),
      ),
      DomainError::EmptyCart
      | DomainError::InvalidQuantity(_)
      | DomainError::AmountOverflow
      | DomainError::InvalidRating(_)
      | DomainError::UnknownRole(_)
      | DomainError::UnknownStatus(_)
      | DomainError::UnknownRiderStatus(_)
      | DomainError::InvalidCoordinates { .. } => AppError::Validation(err.to_string()),
    }
  }
}

impl From<LoginRefusal> for AppError {
  fn from(refusal: LoginRefusal) -> Self {
    match refusal {
      LoginRefusal::PendingApproval(role) => AppError::PendingApproval(format!(
        "Your {} account is pending admin approval. You will be able to sign in once it is approved.",
        role
      )),
      LoginRefusal::Deactivated => AppError::Forbidden("This account has been deactivated.".to_string()),
    }
  }
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<sqlx::Error>() {
      Ok(sqlx_err) => AppError::from(sqlx_err),
      Err(other) => AppError::Internal(format!("{:#}", other)),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) | AppError::PendingApproval(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) | AppError::InvalidCart(_) => StatusCode::CONFLICT,
      AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Workflow { .. } | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, code = self.code(), "Responding with error");
    } else {
      tracing::warn!(application_error = %self, code = self.code(), "Responding with error");
    }
    HttpResponse::build(status).json(json!({
      "success": false,
      "error": {
        "code": self.code(),
        "message": self.public_message(),
      }
    }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;
  use tiffin_core::{OrderStatus, Role};
  use uuid::Uuid;

  #[test]
  fn domain_errors_map_to_http_semantics() {
    let illegal = AppError::from(DomainError::IllegalTransition {
      from: OrderStatus::Delivered,
      to: OrderStatus::Preparing,
    });
    assert_eq!(illegal.status_code(), StatusCode::CONFLICT);
    assert_eq!(illegal.code(), "CONFLICT");

    let mixed = AppError::from(DomainError::MixedRestaurants {
      first: Uuid::new_v4(),
      second: Uuid::new_v4(),
    });
    assert_eq!(mixed.code(), "INVALID_CART");
    assert_eq!(mixed.status_code(), StatusCode::CONFLICT);

    assert_eq!(AppError::from(DomainError::EmptyCart).status_code(), StatusCode::BAD_REQUEST);
  }

  #[test]
  fn pending_approval_is_a_distinct_forbidden() {
    let err = AppError::from(LoginRefusal::PendingApproval(Role::Rider));
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(err.code(), "PENDING_APPROVAL");
    assert_eq!(AppError::from(LoginRefusal::Deactivated).code(), "FORBIDDEN");
  }

  #[test]
  fn pool_timeouts_are_retryable() {
    let err = AppError::from(sqlx::Error::PoolTimedOut);
    assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
  }

  #[test]
  fn internal_details_are_not_exposed() {
    let err = AppError::Internal("secret stack detail".to_string());
    assert_eq!(err.public_message(), "An internal error occurred.");
  }
}
