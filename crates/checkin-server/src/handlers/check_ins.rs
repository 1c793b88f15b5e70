//! Handlers for `/check-ins`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/check-ins` | JSON or form body; 201 when mirrored, 202 when only stored |
//! | `GET`  | `/check-ins` | Every record, oldest first |

use std::net::SocketAddr;

use axum::{
  Form, Json,
  extract::{ConnectInfo, FromRequest, Request, State},
  http::{StatusCode, header},
  response::IntoResponse,
};
use checkin_core::{
  MirrorFailure, MirrorOutcome, SyncResult,
  mirror::{Mirror, MirrorReference},
  record::{CheckInInput, Record},
  store::RecordStore,
};
use serde::Serialize;

use crate::{AppState, error::ApiError};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

// ─── Submit ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
  /// `mirrored` or `mirror_failed`.
  pub status:       &'static str,
  pub record:       Record,
  pub mirror:       Option<MirrorReference>,
  pub mirror_error: Option<MirrorFailure>,
}

impl From<SyncResult> for SubmitResponse {
  fn from(result: SyncResult) -> Self {
    match result.mirror {
      MirrorOutcome::Mirrored(reference) => Self {
        status:       "mirrored",
        record:       result.record,
        mirror:       Some(reference),
        mirror_error: None,
      },
      MirrorOutcome::Failed(failure) => Self {
        status:       "mirror_failed",
        record:       result.record,
        mirror:       None,
        mirror_error: Some(failure),
      },
    }
  }
}

/// `POST /check-ins`
pub async fn submit<S, M>(
  State(state): State<AppState<S, M>>,
  req: Request,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + 'static,
  M: Mirror + 'static,
{
  let origin = client_origin(&req);
  let input = read_input(req).await?;

  let result = state
    .coordinator
    .record_check_in(input, &origin)
    .await
    .map_err(|e| state.api_error(e))?;

  let status = if result.is_mirrored() { StatusCode::CREATED } else { StatusCode::ACCEPTED };
  Ok((status, Json(SubmitResponse::from(result))))
}

/// Peer IP as seen by the listener, or `unknown` when not served over a
/// socket.
fn client_origin(req: &Request) -> String {
  req
    .extensions()
    .get::<ConnectInfo<SocketAddr>>()
    .map(|ConnectInfo(addr)| addr.ip().to_string())
    .unwrap_or_else(|| "unknown".to_owned())
}

async fn read_input(req: Request) -> Result<CheckInInput, ApiError> {
  let is_form = req
    .headers()
    .get(header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|ct| ct.starts_with(FORM_CONTENT_TYPE));

  if is_form {
    let Form(input) = Form::<CheckInInput>::from_request(req, &())
      .await
      .map_err(|r| ApiError::Body { status: r.status(), message: r.body_text() })?;
    Ok(input)
  } else {
    let Json(input) = Json::<CheckInInput>::from_request(req, &())
      .await
      .map_err(|r| ApiError::Body { status: r.status(), message: r.body_text() })?;
    Ok(input)
  }
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RecordList {
  pub records: Vec<Record>,
}

/// `GET /check-ins`
pub async fn list<S, M>(State(state): State<AppState<S, M>>) -> Result<Json<RecordList>, ApiError>
where
  S: RecordStore + 'static,
  M: Mirror + 'static,
{
  let records = state
    .coordinator
    .list_all_records()
    .await
    .map_err(|e| state.api_error(e))?;
  Ok(Json(RecordList { records }))
}
