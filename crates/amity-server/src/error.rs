//! API error type and [`axum::response::IntoResponse`] implementation.

use amity_core::ErrorKind;
use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
///
/// Domain failures carry their [`ErrorKind`], which picks the HTTP status;
/// the two boundary-only variants cover requests that never reach the
/// domain layer.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Domain(#[from] amity_core::Error),

  #[error("missing or malformed bearer token")]
  Unauthorized,

  #[error("not allowed")]
  Forbidden,
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Domain(e) => (status_for(e.kind()), e.to_string()),
      ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
      ApiError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

fn status_for(kind: ErrorKind) -> StatusCode {
  match kind {
    ErrorKind::Validation => StatusCode::BAD_REQUEST,
    ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
    ErrorKind::Authorization => StatusCode::FORBIDDEN,
    ErrorKind::NotFound => StatusCode::NOT_FOUND,
    ErrorKind::Provisioning => StatusCode::INTERNAL_SERVER_ERROR,
  }
}
