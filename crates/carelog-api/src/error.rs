//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use carelog_core::validate::FieldError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("validation failed")]
  Validation(Vec<FieldError>),

  #[error("conflict: {0}")]
  Duplicate(String),

  #[error("precondition failed: {0}")]
  PreconditionFailed(String),

  #[error("store unavailable: {0}")]
  StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<carelog_core::Error> for ApiError {
  fn from(err: carelog_core::Error) -> Self {
    use carelog_core::Error as E;

    match err {
      E::ValidationFailed(errors) => ApiError::Validation(errors),
      E::NotFound(id) => ApiError::NotFound(format!("incident {id} not found")),
      e @ E::DuplicateId(_) => ApiError::Duplicate(e.to_string()),
      e @ E::Conflict { .. } => ApiError::PreconditionFailed(e.to_string()),
      e @ E::UnknownValue { .. } => ApiError::BadRequest(e.to_string()),
      E::StoreUnavailable(source) => ApiError::StoreUnavailable(source),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, json!({ "error": m }))
      }
      ApiError::Validation(errors) => (
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({ "error": "validation failed", "field_errors": errors }),
      ),
      ApiError::Duplicate(m) => (StatusCode::CONFLICT, json!({ "error": m })),
      ApiError::PreconditionFailed(m) => {
        (StatusCode::PRECONDITION_FAILED, json!({ "error": m }))
      }
      ApiError::StoreUnavailable(e) => {
        tracing::error!(error = %e, "store unavailable");
        (StatusCode::SERVICE_UNAVAILABLE, json!({ "error": e.to_string() }))
      }
    };
    (status, Json(body)).into_response()
  }
}
