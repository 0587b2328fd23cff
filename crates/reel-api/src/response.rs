//! The uniform success envelope.
//!
//! Every successful response carries the same JSON shape:
//! `{ "statusCode": …, "data": …, "message": …, "success": true }`.
//! Errors use the mirror-image shape in [`crate::error::ApiError`].

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;

/// A success payload plus the HTTP status it rides on.
#[derive(Debug)]
pub struct Envelope<T> {
  status:  StatusCode,
  data:    T,
  message: String,
}

#[derive(Serialize)]
struct Body<T> {
  #[serde(rename = "statusCode")]
  status_code: u16,
  data:        T,
  message:     String,
  success:     bool,
}

impl<T: Serialize> Envelope<T> {
  pub fn new(status: StatusCode, data: T, message: impl Into<String>) -> Self {
    Self { status, data, message: message.into() }
  }

  /// 200 OK.
  pub fn ok(data: T, message: impl Into<String>) -> Self {
    Self::new(StatusCode::OK, data, message)
  }

  /// 201 Created.
  pub fn created(data: T, message: impl Into<String>) -> Self {
    Self::new(StatusCode::CREATED, data, message)
  }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
  fn into_response(self) -> Response {
    let body = Body {
      status_code: self.status.as_u16(),
      data:        self.data,
      message:     self.message,
      success:     self.status.as_u16() < 400,
    };
    (self.status, Json(body)).into_response()
  }
}
