//! Error type for `checkin-drive`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("drive {operation} returned {status}: {body}")]
  Status {
    operation: &'static str,
    status:    u16,
    body:      String,
  },

  #[error("invalid service account key {path}: {reason}")]
  Credentials { path: PathBuf, reason: String },

  #[error("failed to sign token request: {0}")]
  Jwt(#[from] jsonwebtoken::errors::Error),

  #[error("drive unavailable: {0}")]
  Unavailable(String),
}

impl From<Error> for checkin_core::Error {
  fn from(err: Error) -> Self { checkin_core::Error::MirrorUnavailable(Box::new(err)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
