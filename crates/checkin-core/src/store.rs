//! The `RecordStore` trait: the local, durable copy of the table.
//!
//! Implemented by storage backends (e.g. `checkin-store-xlsx`). The
//! coordinator depends on this abstraction, not on a concrete file format.

use std::future::Future;

use bytes::Bytes;

use crate::record::Record;

/// The serialized table exactly as it is stored locally.
#[derive(Debug, Clone)]
pub struct Artifact {
  pub bytes:        Bytes,
  /// MIME type of `bytes`; fixed by the backend's format.
  pub content_type: &'static str,
  pub file_name:    String,
}

/// Abstraction over the local table.
///
/// Appends must be serialized within one process by the implementation:
/// every record ever appended stays present and in order after any later
/// append. Cross-process safety is not promised.
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  /// Every stored record, in insertion order. A store with no backing file
  /// yet is empty, not an error.
  fn load_all(&self) -> impl Future<Output = Result<Vec<Record>, Self::Error>> + Send + '_;

  /// Add `record` as the last row and persist the full table.
  ///
  /// On failure the previously persisted table is left intact.
  fn append(&self, record: Record) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The current persisted table, for mirroring.
  fn artifact(&self) -> impl Future<Output = Result<Artifact, Self::Error>> + Send + '_;

  /// Whether the backing file exists. Used for health reporting.
  fn exists_locally(&self) -> bool;
}
