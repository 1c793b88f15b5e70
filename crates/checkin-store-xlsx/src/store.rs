//! [`TableStore`] — the `.xlsx` implementation of [`RecordStore`].

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use bytes::Bytes;
use checkin_core::{
  record::Record,
  store::{Artifact, RecordStore},
};
use tokio::{io::AsyncWriteExt as _, sync::Mutex};

use crate::{Error, Result, codec};

pub const DEFAULT_SHEET_NAME: &str = "Check-ins";

// ─── Store ───────────────────────────────────────────────────────────────────

/// The check-in table backed by a single workbook on disk.
///
/// Cloning is cheap, and clones share the writer lock, so every handle in a
/// process appends through the same critical section.
#[derive(Clone)]
pub struct TableStore {
  path:       PathBuf,
  sheet_name: String,
  writer:     Arc<Mutex<()>>,
}

impl TableStore {
  /// A store over the workbook at `path`. The file is created on the first
  /// append.
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path:       path.into(),
      sheet_name: DEFAULT_SHEET_NAME.to_owned(),
      writer:     Arc::new(Mutex::new(())),
    }
  }

  /// Name given to the worksheet when the table is written.
  pub fn with_sheet_name(mut self, sheet_name: impl Into<String>) -> Self {
    self.sheet_name = sheet_name.into();
    self
  }

  pub fn path(&self) -> &Path { &self.path }

  async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
    match tokio::fs::read(&self.path).await {
      Ok(bytes) => Ok(Some(bytes)),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(source) => Err(Error::ReadFile { path: self.path.clone(), source }),
    }
  }

  async fn read_records(&self) -> Result<Vec<Record>> {
    let Some(bytes) = self.read_bytes().await? else {
      return Ok(Vec::new());
    };
    tokio::task::spawn_blocking(move || codec::decode(&bytes)).await?
  }

  fn temp_path(&self) -> PathBuf {
    let file_name = self
      .path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| "table.xlsx".to_owned());
    self.path.with_file_name(format!(".{file_name}.tmp"))
  }

  /// Write `bytes` to a sibling temp file, fsync it, then rename it over the
  /// table. The previous table survives any failure.
  async fn replace_file(&self, bytes: &[u8]) -> Result<()> {
    let write_err = |source| Error::WriteFile { path: self.path.clone(), source };

    if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp = self.temp_path();
    let written: std::io::Result<()> = async {
      let mut file = tokio::fs::File::create(&tmp).await?;
      file.write_all(bytes).await?;
      file.sync_all().await?;
      drop(file);
      tokio::fs::rename(&tmp, &self.path).await
    }
    .await;

    if let Err(source) = written {
      let _ = tokio::fs::remove_file(&tmp).await;
      return Err(write_err(source));
    }
    Ok(())
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for TableStore {
  type Error = Error;

  async fn load_all(&self) -> Result<Vec<Record>> { self.read_records().await }

  async fn append(&self, record: Record) -> Result<()> {
    // Held from before the read until after the rename.
    let _guard = self.writer.lock().await;

    let mut records = self.read_records().await?;
    records.push(record);
    let rows = records.len();

    let sheet_name = self.sheet_name.clone();
    let bytes =
      tokio::task::spawn_blocking(move || codec::encode(&records, &sheet_name)).await??;

    self.replace_file(&bytes).await?;
    tracing::debug!(rows, path = %self.path.display(), "table rewritten");
    Ok(())
  }

  async fn artifact(&self) -> Result<Artifact> {
    let _guard = self.writer.lock().await;

    let bytes = self
      .read_bytes()
      .await?
      .ok_or_else(|| Error::Missing(self.path.clone()))?;

    let file_name = self
      .path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default();

    Ok(Artifact { bytes: Bytes::from(bytes), content_type: codec::CONTENT_TYPE, file_name })
  }

  fn exists_locally(&self) -> bool { self.path.is_file() }
}
