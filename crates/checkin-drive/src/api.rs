//! The `DriveApi` trait: the remote object-storage operations the mirror
//! needs, and nothing more.

use std::future::Future;

use checkin_core::store::Artifact;
use serde::{Deserialize, Serialize};

use crate::Result;

pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

/// A file or folder as reported by Drive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
  pub id:            String,
  #[serde(default)]
  pub name:          String,
  #[serde(default)]
  pub web_view_link: Option<String>,
}

/// Remote object-storage operations, all scoped to not-trashed items.
///
/// Searches return the oldest match when several share a name.
pub trait DriveApi: Send + Sync {
  fn find_folder<'a>(
    &'a self,
    name: &'a str,
    parent: &'a str,
  ) -> impl Future<Output = Result<Option<DriveFile>>> + Send + 'a;

  fn find_file<'a>(
    &'a self,
    name: &'a str,
    parent: &'a str,
  ) -> impl Future<Output = Result<Option<DriveFile>>> + Send + 'a;

  fn create_folder<'a>(
    &'a self,
    name: &'a str,
    parent: &'a str,
  ) -> impl Future<Output = Result<DriveFile>> + Send + 'a;

  /// Create a file in `parent` with `content` as its body.
  fn create_file<'a>(
    &'a self,
    name: &'a str,
    parent: &'a str,
    content: &'a Artifact,
  ) -> impl Future<Output = Result<DriveFile>> + Send + 'a;

  /// Replace the body of an existing file.
  fn update_file<'a>(
    &'a self,
    id: &'a str,
    content: &'a Artifact,
  ) -> impl Future<Output = Result<DriveFile>> + Send + 'a;

  /// Let anyone with the link read `id`.
  fn grant_public_read<'a>(&'a self, id: &'a str) -> impl Future<Output = Result<()>> + Send + 'a;
}
