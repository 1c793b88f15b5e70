//! [`SyncCoordinator`] — drives one check-in from validation to mirror.
//!
//! Per request: `Received → Validated → Appended → Mirrored`, or ends early
//! as `Rejected` (validation), `AppendFailed` (local store), or
//! `MirrorFailed` (partial success: the local row stays). No step is retried.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
  Error, ErrorKind, Result,
  mirror::{Mirror, MirrorReference},
  record::{COLUMNS, CheckInInput, MAX_FIELD_CHARS, Record},
  store::RecordStore,
  time,
};

/// Default bound on the whole mirror step.
pub const DEFAULT_MIRROR_TIMEOUT: Duration = Duration::from_secs(30);

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Why the mirror step failed, as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MirrorFailure {
  pub kind:    ErrorKind,
  pub message: String,
}

impl From<&Error> for MirrorFailure {
  fn from(err: &Error) -> Self {
    Self { kind: err.kind(), message: err.to_string() }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorOutcome {
  Mirrored(MirrorReference),
  /// Stored locally, but the mirror could not be updated.
  Failed(MirrorFailure),
}

/// The result of a check-in that was durably stored.
#[derive(Debug, Clone)]
pub struct SyncResult {
  pub record: Record,
  pub mirror: MirrorOutcome,
}

impl SyncResult {
  pub fn is_mirrored(&self) -> bool { matches!(self.mirror, MirrorOutcome::Mirrored(_)) }
}

// ─── Coordinator ─────────────────────────────────────────────────────────────

pub struct SyncCoordinator<S, M> {
  store:          S,
  mirror:         M,
  mirror_timeout: Duration,
  /// Serializes mirror uploads so the last one always carries the newest
  /// table, and so one process never races itself into a duplicate object.
  mirror_lock:    Mutex<()>,
}

impl<S, M> SyncCoordinator<S, M>
where
  S: RecordStore,
  M: Mirror,
{
  pub fn new(store: S, mirror: M) -> Self {
    Self {
      store,
      mirror,
      mirror_timeout: DEFAULT_MIRROR_TIMEOUT,
      mirror_lock: Mutex::new(()),
    }
  }

  pub fn with_mirror_timeout(mut self, timeout: Duration) -> Self {
    self.mirror_timeout = timeout;
    self
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn mirror(&self) -> &M { &self.mirror }

  /// Validate, stamp, append locally, then mirror.
  ///
  /// Returns `Err` only when nothing was stored. A mirror failure after a
  /// successful append is reported inside the [`SyncResult`].
  pub async fn record_check_in(&self, input: CheckInInput, origin: &str) -> Result<SyncResult> {
    let record = build_record(input, origin)?;

    self
      .store
      .append(record.clone())
      .await
      .map_err(Into::<Error>::into)?;
    tracing::info!(id_number = %record.id_number, site = %record.site, "check-in stored");

    let mirror = match self.push_mirror().await {
      Ok(reference) => {
        tracing::info!(object = %reference.id, "mirror updated");
        MirrorOutcome::Mirrored(reference)
      }
      Err(err) => {
        tracing::warn!(error = %err, "check-in stored locally but mirror update failed");
        MirrorOutcome::Failed(MirrorFailure::from(&err))
      }
    };

    Ok(SyncResult { record, mirror })
  }

  /// Every stored record, in insertion order.
  pub async fn list_all_records(&self) -> Result<Vec<Record>> {
    self.store.load_all().await.map_err(Into::into)
  }

  pub fn table_exists(&self) -> bool { self.store.exists_locally() }

  async fn push_mirror(&self) -> Result<MirrorReference> {
    let _guard = self.mirror_lock.lock().await;

    let artifact = self.store.artifact().await.map_err(Into::<Error>::into)?;

    match tokio::time::timeout(self.mirror_timeout, self.mirror.upsert(artifact)).await {
      Ok(result) => result.map_err(Into::into),
      Err(_) => Err(Error::MirrorUnavailable(
        format!("mirror update timed out after {:?}", self.mirror_timeout).into(),
      )),
    }
  }
}

// ─── Record construction ─────────────────────────────────────────────────────

fn build_record(input: CheckInInput, origin: &str) -> Result<Record> {
  let name = required("name", input.name)?;
  let id_number = required("id_number", input.id_number)?;
  let site = required("site", input.site)?;

  let time_in = stamp("time_in", input.time_in.as_deref())?;
  let time_out = stamp("time_out", input.time_out.as_deref())?;

  let record = Record {
    name,
    id_number,
    site,
    time_in,
    time_out,
    notes: input.notes.unwrap_or_default(),
    recorded_at: Record::now(),
    origin: origin.to_owned(),
  };

  for (field, value) in COLUMNS.iter().zip(record.cells()) {
    fits_cell(field, &value)?;
  }
  Ok(record)
}

fn fits_cell(field: &str, value: &str) -> Result<()> {
  let len = value.chars().count();
  if len > MAX_FIELD_CHARS {
    tracing::debug!(field, len, "rejected check-in with oversized field");
    return Err(Error::validation(format!(
      "{field}: {len} characters exceeds the limit of {MAX_FIELD_CHARS}"
    )));
  }
  Ok(())
}

fn required(field: &str, value: Option<String>) -> Result<String> {
  match value.as_deref().map(str::trim) {
    Some(v) if !v.is_empty() => Ok(v.to_owned()),
    _ => {
      tracing::debug!(field, "rejected check-in with missing field");
      Err(Error::validation("name, id_number and site are required"))
    }
  }
}

fn stamp(field: &str, value: Option<&str>) -> Result<String> {
  time::combine(value.unwrap_or_default()).map_err(|err| match err {
    Error::Validation(msg) => Error::validation(format!("{field}: {msg}")),
    other => other,
  })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
