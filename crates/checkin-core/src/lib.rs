//! Core types and trait definitions for the check-in recorder.
//!
//! This crate is deliberately free of HTTP, spreadsheet and cloud-storage
//! dependencies. Backends implement [`store::RecordStore`] and
//! [`mirror::Mirror`]; the [`SyncCoordinator`] drives one check-in through
//! validation, local persistence and remote mirroring.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod coordinator;
pub mod error;
pub mod mirror;
pub mod record;
pub mod store;
pub mod time;

pub use coordinator::{MirrorFailure, MirrorOutcome, SyncCoordinator, SyncResult};
pub use error::{BoxError, Error, ErrorKind, Result};
