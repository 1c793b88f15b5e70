//! `.xlsx` backend for the check-in table.
//!
//! The whole table lives in the first worksheet of a single workbook. Every
//! append rewrites the file through a sibling temp file and a rename, under
//! an in-process writer lock.

mod codec;
mod store;

pub mod error;

pub use codec::CONTENT_TYPE;
pub use error::{Error, Result};
pub use store::{DEFAULT_SHEET_NAME, TableStore};
