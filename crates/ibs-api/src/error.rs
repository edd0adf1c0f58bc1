//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::{multipart::MultipartError, rejection::JsonRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use ibs_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] CoreError),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("unreadable file: {0}")]
  Sheet(#[from] ibs_sheet::Error),

  #[error("upload error: {0}")]
  Upload(#[from] MultipartError),
}

impl ApiError {
  /// Classify a store failure.
  pub fn store<E: Into<CoreError>>(err: E) -> Self { Self::Core(err.into()) }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

fn internal(err: &dyn std::error::Error) -> Response {
  tracing::error!(error = %err, "request failed");
  let body = if cfg!(debug_assertions) {
    json!({ "error": "internal server error", "detail": err.to_string() })
  } else {
    json!({ "error": "internal server error" })
  };
  (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match self {
      ApiError::Core(err) => match &err {
        CoreError::NotFound { .. } => {
          (StatusCode::NOT_FOUND, json!({ "error": err.to_string() }))
        }
        CoreError::Conflict { message, fields } => (
          StatusCode::CONFLICT,
          json!({ "error": message, "fields": fields }),
        ),
        CoreError::InUse { dependents, .. } => (
          StatusCode::CONFLICT,
          json!({ "error": err.to_string(), "dependents": dependents }),
        ),
        CoreError::Validation(errors) => (
          StatusCode::BAD_REQUEST,
          json!({ "error": "validation failed", "errors": errors }),
        ),
        CoreError::Backend(_) => return internal(&err),
      },
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
      ApiError::Sheet(e) => (StatusCode::BAD_REQUEST, json!({ "error": e.to_string() })),
      ApiError::Upload(e) => (e.status(), json!({ "error": e.body_text() })),
    };
    (status, Json(body)).into_response()
  }
}
