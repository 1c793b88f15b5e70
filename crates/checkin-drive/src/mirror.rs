//! [`DriveMirror`] — keeps exactly one copy of the table in Drive.
//!
//! The object is located by name on every upload, never by a remembered id,
//! so a file deleted or replaced by hand is picked up on the next check-in.
//! The group folder's public grant is re-issued until it has succeeded once
//! for the folder currently in use.

use std::sync::{Mutex, PoisonError};

use checkin_core::{
  mirror::{Mirror, MirrorReference},
  store::Artifact,
};

use crate::{Error, Result, api::DriveApi};

/// Where the mirror object lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorSettings {
  /// Folder that contains everything the mirror creates.
  pub root_folder_id: String,
  /// File name of the mirror object.
  pub object_name:    String,
  /// Optional subfolder of the root, created on demand.
  pub group_name:     Option<String>,
}

pub struct DriveMirror<A> {
  api:      A,
  settings: MirrorSettings,
  /// Group folder whose public grant has gone through.
  shared:   Mutex<Option<String>>,
}

impl<A: DriveApi> DriveMirror<A> {
  pub fn new(api: A, settings: MirrorSettings) -> Self {
    Self { api, settings, shared: Mutex::new(None) }
  }

  pub fn api(&self) -> &A { &self.api }

  pub fn settings(&self) -> &MirrorSettings { &self.settings }

  /// The folder the object goes into: the group folder if one is configured
  /// (created on first use and made link-readable), otherwise the root.
  async fn resolve_container(&self) -> Result<String> {
    let root = &self.settings.root_folder_id;
    let Some(group) = self.settings.group_name.as_deref() else {
      return Ok(root.clone());
    };

    let folder = match self.api.find_folder(group, root).await? {
      Some(folder) => folder,
      None => {
        tracing::info!(group, "creating mirror group folder");
        self.api.create_folder(group, root).await?
      }
    };

    if !self.is_shared(&folder.id) {
      tracing::debug!(id = %folder.id, "granting public read on group folder");
      self.api.grant_public_read(&folder.id).await?;
      *self.shared.lock().unwrap_or_else(PoisonError::into_inner) = Some(folder.id.clone());
    }
    Ok(folder.id)
  }

  fn is_shared(&self, id: &str) -> bool {
    self.shared.lock().unwrap_or_else(PoisonError::into_inner).as_deref() == Some(id)
  }
}

impl<A: DriveApi> Mirror for DriveMirror<A> {
  type Error = Error;

  async fn upsert(&self, artifact: Artifact) -> Result<MirrorReference> {
    let container = self.resolve_container().await?;
    let name = &self.settings.object_name;

    let file = match self.api.find_file(name, &container).await? {
      Some(existing) => {
        tracing::debug!(id = %existing.id, "updating mirror object");
        self.api.update_file(&existing.id, &artifact).await?
      }
      None => {
        tracing::info!(name = %name, container = %container, "creating mirror object");
        self.api.create_file(name, &container, &artifact).await?
      }
    };

    let url = file
      .web_view_link
      .unwrap_or_else(|| format!("https://drive.google.com/file/d/{}/view", file.id));
    Ok(MirrorReference { id: file.id, url })
  }
}
