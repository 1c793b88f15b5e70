//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use checkin_core::{Error, ErrorKind};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// The body could not be read as a check-in.
  #[error("{message}")]
  Body { status: StatusCode, message: String },

  #[error("{source}")]
  Core {
    #[source]
    source:         Error,
    /// Show the underlying message on 500s.
    expose_details: bool,
  },
}

impl ApiError {
  pub fn core(source: Error, expose_details: bool) -> Self {
    Self::Core { source, expose_details }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Body { status, .. } => *status,
      ApiError::Core { source, .. } => match source.kind() {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        // The coordinator reports mirror failures inside a partial success;
        // one escaping here is a bug, not an upstream outage.
        ErrorKind::StoreCorrupt | ErrorKind::StoreWrite | ErrorKind::MirrorUnavailable => {
          StatusCode::INTERNAL_SERVER_ERROR
        }
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let (kind, message) = match &self {
      ApiError::Body { message, .. } => (json!("invalid_body"), message.clone()),
      ApiError::Core { source, expose_details } => {
        let message = if status.is_server_error() {
          tracing::error!(error = %source, "request failed");
          if *expose_details { source.to_string() } else { "internal error".to_owned() }
        } else {
          match source {
            Error::Validation(msg) => msg.clone(),
            other => other.to_string(),
          }
        };
        (json!(source.kind()), message)
      }
    };
    (status, Json(json!({ "error": { "kind": kind, "message": message } }))).into_response()
  }
}
