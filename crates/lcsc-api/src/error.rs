//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error body has the same shape:
//!
//! ```json
//! {"error": "invalid role: \"Janitor\"", "source": "client", "retryable": false}
//! ```

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Core(#[from] lcsc_core::Error),
}

impl ApiError {
  /// Wrap a store failure as an upstream error.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Core(lcsc_core::Error::collaborator(err))
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Core(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
      ApiError::Core(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
  }

  /// Upstream failures are worth retrying; bad input is not.
  pub fn is_retryable(&self) -> bool {
    matches!(self, ApiError::Core(e) if !e.is_client_error())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let retryable = self.is_retryable();
    if retryable {
      tracing::error!(error = %self, "upstream failure");
    }
    let source = if retryable { "upstream" } else { "client" };
    let body = json!({
      "error": self.to_string(),
      "source": source,
      "retryable": retryable,
    });
    (status, Json(body)).into_response()
  }
}
