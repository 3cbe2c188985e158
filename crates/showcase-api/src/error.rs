//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::multipart::MultipartError,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use showcase_core::validate::FieldErrors;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  /// Bad or missing sign-in credentials.
  #[error("unauthorized")]
  Unauthorized,

  /// The role guard turned the caller away; they are sent back to `/`.
  #[error("redirect")]
  Redirect,

  #[error("validation failed: {0}")]
  Invalid(FieldErrors),

  #[error("multipart error: {0}")]
  Multipart(#[from] MultipartError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<showcase_core::Error> for ApiError {
  fn from(e: showcase_core::Error) -> Self {
    use showcase_core::Error as E;
    match e {
      E::Validation(fields) => ApiError::Invalid(fields),
      E::DuplicateTag { .. } | E::EmailTaken(_) | E::AlreadyApplied(_) => {
        ApiError::Conflict(e.to_string())
      }
      E::InvalidCredentials => ApiError::Unauthorized,
      E::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
      other => ApiError::Store(Box::new(other)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, Json(json!({ "error": m }))).into_response(),
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Conflict(m) => (StatusCode::CONFLICT, Json(json!({ "error": m }))).into_response(),
      ApiError::Unauthorized => {
        let mut res =
          (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid email or password" })))
            .into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"showcase\""),
        );
        res
      }
      ApiError::Redirect => Redirect::to("/").into_response(),
      ApiError::Invalid(fields) => (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "error": "validation failed", "fields": fields })),
      )
        .into_response(),
      ApiError::Multipart(e) => e.into_response(),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "backend error");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "error": "internal server error" })),
        )
          .into_response()
      }
    }
  }
}
