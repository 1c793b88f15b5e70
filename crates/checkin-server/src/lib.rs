//! HTTP surface of the check-in recorder.
//!
//! Exposes an axum [`Router`] over a [`SyncCoordinator`], generic over any
//! [`RecordStore`] and [`Mirror`].

pub mod config;
pub mod error;
pub mod handlers;

pub use config::{Credentials, MirrorConfig, ServerConfig};
pub use error::ApiError;

use std::{sync::Arc, time::Instant};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  http::{HeaderValue, Method, header},
  routing::{get, post},
};
use checkin_core::{Error, SyncCoordinator, mirror::Mirror, store::RecordStore};
use tower_http::{
  cors::{AllowOrigin, CorsLayer},
  trace::TraceLayer,
};

use handlers::{check_ins, health};

/// Request bodies larger than this are rejected with 413.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, M> {
  pub coordinator: Arc<SyncCoordinator<S, M>>,
  pub config:      Arc<ServerConfig>,
  pub started_at:  Instant,
}

impl<S, M> AppState<S, M> {
  pub fn new(coordinator: SyncCoordinator<S, M>, config: ServerConfig) -> Self {
    Self {
      coordinator: Arc::new(coordinator),
      config:      Arc::new(config),
      started_at:  Instant::now(),
    }
  }

  pub(crate) fn api_error(&self, err: Error) -> ApiError {
    ApiError::core(err, self.config.expose_error_details)
  }
}

// Manual impl: `derive` would demand `S: Clone, M: Clone`.
impl<S, M> Clone for AppState<S, M> {
  fn clone(&self) -> Self {
    Self {
      coordinator: Arc::clone(&self.coordinator),
      config:      Arc::clone(&self.config),
      started_at:  self.started_at,
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the check-in API.
pub fn router<S, M>(state: AppState<S, M>) -> Router
where
  S: RecordStore + 'static,
  M: Mirror + 'static,
{
  let cors = cors_layer(&state.config.allowed_origins);

  Router::new()
    .route("/check-ins", post(check_ins::submit::<S, M>).get(check_ins::list::<S, M>))
    .route("/health",    get(health::handler::<S, M>))
    .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
    .layer(cors)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
  let allowed: Vec<HeaderValue> = origins
    .iter()
    .filter_map(|origin| match HeaderValue::from_str(origin) {
      Ok(value) => Some(value),
      Err(_) => {
        tracing::warn!(origin = %origin, "ignoring unparseable CORS origin");
        None
      }
    })
    .collect();

  CorsLayer::new()
    .allow_origin(AllowOrigin::list(allowed))
    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    .allow_credentials(true)
}

// ─── Integration tests ───────────────────────────────────────────────────────
