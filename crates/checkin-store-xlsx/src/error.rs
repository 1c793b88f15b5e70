//! Error type for `checkin-store-xlsx`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to read {path}: {source}")]
  ReadFile {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to write {path}: {source}")]
  WriteFile {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("workbook is unreadable: {0}")]
  Decode(#[from] calamine::XlsxError),

  #[error("workbook could not be encoded: {0}")]
  Encode(#[from] rust_xlsxwriter::XlsxError),

  #[error("row {row}: {reason}")]
  Row { row: usize, reason: String },

  #[error("table {0} has not been written yet")]
  Missing(PathBuf),

  #[error("codec task failed: {0}")]
  Task(#[from] tokio::task::JoinError),
}

impl From<Error> for checkin_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::ReadFile { .. } | Error::Decode(_) | Error::Row { .. } | Error::Missing(_) => {
        checkin_core::Error::StoreCorrupt(Box::new(err))
      }
      Error::WriteFile { .. } | Error::Encode(_) | Error::Task(_) => {
        checkin_core::Error::StoreWrite(Box::new(err))
      }
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
