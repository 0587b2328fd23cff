//! API error type and axum `IntoResponse` implementation.
//!
//! Failures surface as the uniform error envelope:
//! `{ "statusCode", "message", "data": null, "success": false, "errors": [] }`.
//! Backend details are logged, never serialised into a response.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("password hash error: {0}")]
  PasswordHash(String),

  #[error("asset error: {0}")]
  Asset(#[from] crate::assets::AssetError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Wrap a backend error; used where handler code calls into the store.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  fn status(&self) -> StatusCode {
    match self {
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      Self::Forbidden(_) => StatusCode::FORBIDDEN,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Conflict(_) => StatusCode::CONFLICT,
      Self::PasswordHash(_) | Self::Asset(_) | Self::Store(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();

    let message = match &self {
      ApiError::BadRequest(m)
      | ApiError::Unauthorized(m)
      | ApiError::Forbidden(m)
      | ApiError::NotFound(m)
      | ApiError::Conflict(m) => m.clone(),
      ApiError::PasswordHash(e) => {
        tracing::error!(error = %e, "password hashing failure");
        "internal server error".to_owned()
      }
      ApiError::Asset(e) => {
        tracing::error!(error = %e, "asset store failure");
        "media storage failure".to_owned()
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        "internal server error".to_owned()
      }
    };

    let body = json!({
      "statusCode": status.as_u16(),
      "data": null,
      "message": message,
      "success": false,
      "errors": [],
    });

    (status, Json(body)).into_response()
  }
}
