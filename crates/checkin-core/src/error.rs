//! Error taxonomy shared by every layer of the check-in recorder.
//!
//! Backends keep their own error enums and convert into [`Error`] at the
//! trait boundary, so the coordinator can tell a rejected request from a
//! failed write or an unreachable mirror.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  /// Caller-supplied data is insufficient. Never retried.
  #[error("validation failed: {0}")]
  Validation(String),

  /// The local table exists but cannot be read back.
  #[error("stored table is unreadable: {0}")]
  StoreCorrupt(#[source] BoxError),

  /// The local table could not be rewritten. The previous file is intact.
  #[error("failed to write table: {0}")]
  StoreWrite(#[source] BoxError),

  /// The remote mirror step failed after the local append succeeded.
  #[error("mirror unavailable: {0}")]
  MirrorUnavailable(#[source] BoxError),
}

impl Error {
  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::Validation(_) => ErrorKind::Validation,
      Error::StoreCorrupt(_) => ErrorKind::StoreCorrupt,
      Error::StoreWrite(_) => ErrorKind::StoreWrite,
      Error::MirrorUnavailable(_) => ErrorKind::MirrorUnavailable,
    }
  }
}

/// Machine-readable discriminant of [`Error`], as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  Validation,
  StoreCorrupt,
  StoreWrite,
  MirrorUnavailable,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
