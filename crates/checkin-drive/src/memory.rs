//! An in-process [`DriveApi`] for tests and offline runs.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use checkin_core::store::Artifact;

use crate::{
  Error, Result,
  api::{DriveApi, DriveFile, FOLDER_MIME},
};

/// One stored item. Folders have empty content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
  pub id:           String,
  pub name:         String,
  pub parent:       String,
  pub is_folder:    bool,
  pub content:      Bytes,
  pub content_type: String,
  pub public:       bool,
}

impl StoredFile {
  fn as_drive_file(&self) -> DriveFile {
    DriveFile {
      id:            self.id.clone(),
      name:          self.name.clone(),
      web_view_link: Some(format!("memory://{}", self.id)),
    }
  }
}

#[derive(Debug, Default)]
struct State {
  files:       Vec<StoredFile>,
  next_id:     u64,
  unavailable: bool,
  fail_grants: bool,
  grant_calls: usize,
}

/// Items are kept in creation order, so the first match is the oldest.
#[derive(Debug, Clone, Default)]
pub struct MemoryDrive {
  state: Arc<Mutex<State>>,
}

impl MemoryDrive {
  pub fn new() -> Self { Self::default() }

  fn state(&self) -> MutexGuard<'_, State> {
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// While set, every call fails with [`Error::Unavailable`].
  pub fn set_unavailable(&self, unavailable: bool) { self.state().unavailable = unavailable; }

  /// While set, only [`DriveApi::grant_public_read`] fails.
  pub fn set_grants_failing(&self, failing: bool) { self.state().fail_grants = failing; }

  /// Number of [`DriveApi::grant_public_read`] calls made, failed ones included.
  pub fn grant_calls(&self) -> usize { self.state().grant_calls }

  pub fn files(&self) -> Vec<StoredFile> { self.state().files.clone() }

  /// Delete every item with this name, as if removed by hand.
  pub fn remove_named(&self, name: &str) { self.state().files.retain(|f| f.name != name); }

  pub fn files_named(&self, name: &str) -> Vec<StoredFile> {
    self.state().files.iter().filter(|f| f.name == name).cloned().collect()
  }

  /// Seed an item as if it had been created out of band. Returns its id.
  pub fn insert_file(&self, name: &str, parent: &str, is_folder: bool, content: &[u8]) -> String {
    let mut state = self.state();
    let id = allocate(&mut state);
    state.files.push(StoredFile {
      id:           id.clone(),
      name:         name.to_owned(),
      parent:       parent.to_owned(),
      is_folder,
      content:      Bytes::copy_from_slice(content),
      content_type: if is_folder { FOLDER_MIME.to_owned() } else { String::new() },
      public:       false,
    });
    id
  }

  fn available(&self) -> Result<MutexGuard<'_, State>> {
    let state = self.state();
    if state.unavailable {
      return Err(Error::Unavailable("memory drive switched off".into()));
    }
    Ok(state)
  }

  fn find(&self, name: &str, parent: &str, folder: bool) -> Result<Option<DriveFile>> {
    let state = self.available()?;
    Ok(
      state
        .files
        .iter()
        .find(|f| f.name == name && f.parent == parent && f.is_folder == folder)
        .map(StoredFile::as_drive_file),
    )
  }

  fn create(&self, name: &str, parent: &str, content: Option<&Artifact>) -> Result<DriveFile> {
    let mut state = self.available()?;
    let id = allocate(&mut state);
    let file = StoredFile {
      id,
      name: name.to_owned(),
      parent: parent.to_owned(),
      is_folder: content.is_none(),
      content: content.map(|a| a.bytes.clone()).unwrap_or_default(),
      content_type: content.map_or(FOLDER_MIME, |a| a.content_type).to_owned(),
      public: false,
    };
    let created = file.as_drive_file();
    state.files.push(file);
    Ok(created)
  }

  fn with_file<T>(&self, id: &str, f: impl FnOnce(&mut StoredFile) -> T) -> Result<T> {
    let mut state = self.available()?;
    state
      .files
      .iter_mut()
      .find(|file| file.id == id)
      .map(f)
      .ok_or_else(|| Error::Status { operation: "lookup", status: 404, body: id.to_owned() })
  }
}

fn allocate(state: &mut State) -> String {
  state.next_id += 1;
  format!("mem-{}", state.next_id)
}

impl DriveApi for MemoryDrive {
  async fn find_folder<'a>(&'a self, name: &'a str, parent: &'a str) -> Result<Option<DriveFile>> {
    self.find(name, parent, true)
  }

  async fn find_file<'a>(&'a self, name: &'a str, parent: &'a str) -> Result<Option<DriveFile>> {
    self.find(name, parent, false)
  }

  async fn create_folder<'a>(&'a self, name: &'a str, parent: &'a str) -> Result<DriveFile> {
    self.create(name, parent, None)
  }

  async fn create_file<'a>(
    &'a self,
    name: &'a str,
    parent: &'a str,
    content: &'a Artifact,
  ) -> Result<DriveFile> {
    self.create(name, parent, Some(content))
  }

  async fn update_file<'a>(&'a self, id: &'a str, content: &'a Artifact) -> Result<DriveFile> {
    self.with_file(id, |file| {
      file.content = content.bytes.clone();
      file.content_type = content.content_type.to_owned();
      file.as_drive_file()
    })
  }

  async fn grant_public_read<'a>(&'a self, id: &'a str) -> Result<()> {
    {
      let mut state = self.available()?;
      state.grant_calls += 1;
      if state.fail_grants {
        return Err(Error::Unavailable("permission grant refused".into()));
      }
    }
    self.with_file(id, |file| file.public = true)
  }
}
