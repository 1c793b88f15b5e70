//! The `Mirror` trait: a remote copy of the whole table.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::store::Artifact;

/// Stable reference to the remote mirror object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorReference {
  pub id:  String,
  /// Link third parties can open.
  pub url: String,
}

/// Abstraction over the remote mirror.
pub trait Mirror: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  /// Create the mirror object if absent, otherwise replace its content.
  ///
  /// Repeated calls must converge on a single remote object.
  fn upsert(
    &self,
    artifact: Artifact,
  ) -> impl Future<Output = Result<MirrorReference, Self::Error>> + Send + '_;
}
