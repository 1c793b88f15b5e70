//! Encoding and decoding between [`Record`]s and workbook bytes.
//!
//! Row 1 is a bold header row carrying the column names; each following row
//! is one record. Empty strings are left as blank cells. Decoding locates
//! columns by header name, so a hand-edited sheet with reordered or extra
//! columns still reads back.

use std::io::Cursor;

use calamine::{Data, Reader as _, Xlsx};
use checkin_core::record::{COLUMNS, Record, decode_recorded_at};
use rust_xlsxwriter::{Format, Workbook};

use crate::{Error, Result};

pub const CONTENT_TYPE: &str =
  "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// ─── Encode ──────────────────────────────────────────────────────────────────

pub fn encode(records: &[Record], sheet_name: &str) -> Result<Vec<u8>> {
  let mut workbook = Workbook::new();
  let bold = Format::new().set_bold();

  let sheet = workbook.add_worksheet();
  sheet.set_name(sheet_name)?;

  for (col, title) in COLUMNS.iter().enumerate() {
    sheet.write_string_with_format(0, col as u16, *title, &bold)?;
  }

  for (i, record) in records.iter().enumerate() {
    let row = i as u32 + 1;
    for (col, value) in record.cells().iter().enumerate() {
      if !value.is_empty() {
        sheet.write_string(row, col as u16, value.as_str())?;
      }
    }
  }

  Ok(workbook.save_to_buffer()?)
}

// ─── Decode ──────────────────────────────────────────────────────────────────

pub fn decode(bytes: &[u8]) -> Result<Vec<Record>> {
  let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;

  let Some(range) = workbook.worksheet_range_at(0) else {
    return Ok(Vec::new());
  };
  let range = range?;

  let mut rows = range.rows();
  let Some(header) = rows.next() else {
    return Ok(Vec::new());
  };
  let columns = locate_columns(header);

  rows
    .enumerate()
    // Spreadsheet rows are 1-based and row 1 is the header.
    .map(|(i, cells)| (i + 2, cells))
    .filter(|(_, cells)| cells.iter().any(|c| !cell_text(c).is_empty()))
    .map(|(row, cells)| decode_row(row, cells, &columns))
    .collect()
}

/// Index of each of [`COLUMNS`] in the header row, if present.
fn locate_columns(header: &[Data]) -> [Option<usize>; 8] {
  COLUMNS.map(|name| {
    header
      .iter()
      .position(|cell| cell_text(cell).trim() == name)
  })
}

fn decode_row(row: usize, cells: &[Data], columns: &[Option<usize>; 8]) -> Result<Record> {
  let field = |idx: usize| -> String {
    columns[idx]
      .and_then(|col| cells.get(col))
      .map(cell_text)
      .unwrap_or_default()
  };

  let raw_recorded_at = field(6);
  let recorded_at = decode_recorded_at(&raw_recorded_at).ok_or_else(|| Error::Row {
    row,
    reason: format!("invalid recorded_at {raw_recorded_at:?}"),
  })?;

  Ok(Record {
    name: field(0),
    id_number: field(1),
    site: field(2),
    time_in: field(3),
    time_out: field(4),
    notes: field(5),
    recorded_at,
    origin: field(7),
  })
}

/// Render a cell as the text that was (or would have been) typed into it.
fn cell_text(cell: &Data) -> String {
  match cell {
    Data::Empty => String::new(),
    Data::String(s) => s.clone(),
    // Identity numbers typed by hand come back as floats.
    Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
    other => other.to_string(),
  }
}
