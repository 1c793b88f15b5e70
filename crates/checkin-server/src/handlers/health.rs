//! `GET /health`

use axum::{Json, extract::State};
use checkin_core::{mirror::Mirror, store::RecordStore};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
  pub status:                   &'static str,
  pub timestamp:                DateTime<Utc>,
  pub uptime_secs:              u64,
  pub environment:              String,
  /// Whether the local workbook has been written yet.
  pub table_exists:             bool,
  pub mirror_folder_configured: bool,
}

pub async fn handler<S, M>(State(state): State<AppState<S, M>>) -> Json<Health>
where
  S: RecordStore + 'static,
  M: Mirror + 'static,
{
  Json(Health {
    status:                   "ok",
    timestamp:                Utc::now(),
    uptime_secs:              state.started_at.elapsed().as_secs(),
    environment:              state.config.environment.clone(),
    table_exists:             state.coordinator.table_exists(),
    mirror_folder_configured: !state.config.mirror.root_folder_id.trim().is_empty(),
  })
}
