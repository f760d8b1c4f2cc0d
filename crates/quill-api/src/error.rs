//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Absent, or owned by someone else. Both render identically.
  #[error("not found: {0}")]
  NotFound(&'static str),

  #[error("validation failed: {0}")]
  Validation(String),

  #[error("unsupported media type: {0}")]
  UnsupportedMediaType(String),

  #[error("unauthenticated: {0}")]
  Unauthenticated(&'static str),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<quill_core::Error> for ApiError {
  fn from(e: quill_core::Error) -> Self {
    match e {
      quill_core::Error::NoteNotFound(_) => ApiError::NotFound("Note not found"),
      quill_core::Error::VersionNotFound(_) => ApiError::NotFound("Version not found"),
      quill_core::Error::Validation(msg) => ApiError::Validation(msg),
      quill_core::Error::Persistence(source) => ApiError::Internal(source),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    match rejection {
      JsonRejection::MissingJsonContentType(r) => ApiError::UnsupportedMediaType(r.body_text()),
      other => ApiError::Validation(other.body_text()),
    }
  }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { ApiError::Validation(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { ApiError::Validation(rejection.body_text()) }
}

/// Convert any store error into an [`ApiError`] via the core taxonomy.
pub fn store_error<E: Into<quill_core::Error>>(e: E) -> ApiError { ApiError::from(e.into()) }

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, (*m).to_owned()),
      ApiError::Validation(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
      ApiError::UnsupportedMediaType(m) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, m.clone()),
      ApiError::Unauthenticated(m) => (StatusCode::UNAUTHORIZED, (*m).to_owned()),
      ApiError::Internal(e) => {
        // Store detail stays in the logs.
        tracing::error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
      }
    };

    let mut res = (status, Json(json!({ "error": message }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"quill\""),
      );
    }
    res
  }
}
