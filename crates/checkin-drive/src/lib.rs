//! Google Drive mirror for the check-in table.
//!
//! [`DriveMirror`] owns the resolve-then-upsert logic and talks to the
//! remote side through the [`DriveApi`] seam. [`HttpDriveApi`] is the real
//! Drive v3 client; [`MemoryDrive`] is an in-process stand-in.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
#![allow(async_fn_in_trait)]

pub mod api;
pub mod auth;
pub mod error;
pub mod http;
pub mod memory;
pub mod mirror;

pub use api::{DriveApi, DriveFile};
pub use auth::{ServiceAccountKey, TokenProvider};
pub use error::{Error, Result};
pub use http::HttpDriveApi;
pub use memory::MemoryDrive;
pub use mirror::{DriveMirror, MirrorSettings};
