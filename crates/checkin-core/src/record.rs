//! [`Record`], one check-in event, and the [`CheckInInput`] it is built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Column names of the stored table, in storage order.
pub const COLUMNS: [&str; 8] = [
  "name",
  "id_number",
  "site",
  "time_in",
  "time_out",
  "notes",
  "recorded_at",
  "origin",
];

/// Longest value, in characters, a single table cell can hold.
pub const MAX_FIELD_CHARS: usize = 32_767;

/// One persisted check-in. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
  pub name:        String,
  /// External identity of the person checking in.
  pub id_number:   String,
  pub site:        String,
  /// `DD/MM/YYYY HH:MM:SS`, or empty when no time was submitted.
  pub time_in:     String,
  pub time_out:    String,
  pub notes:       String,
  /// Millisecond precision; see [`Record::now`].
  pub recorded_at: DateTime<Utc>,
  /// Network identity of the submitting client.
  pub origin:      String,
}

impl Record {
  /// The current instant truncated to the precision the table stores.
  pub fn now() -> DateTime<Utc> {
    use chrono::SubsecRound as _;
    Utc::now().trunc_subsecs(3)
  }

  /// Field values in [`COLUMNS`] order, with `recorded_at` rendered as
  /// RFC 3339.
  pub fn cells(&self) -> [String; 8] {
    [
      self.name.clone(),
      self.id_number.clone(),
      self.site.clone(),
      self.time_in.clone(),
      self.time_out.clone(),
      self.notes.clone(),
      encode_recorded_at(self.recorded_at),
      self.origin.clone(),
    ]
  }
}

pub fn encode_recorded_at(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn decode_recorded_at(s: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s.trim())
    .ok()
    .map(|dt| dt.with_timezone(&Utc))
}

/// A check-in as submitted by a client, before validation.
///
/// Every field is optional here; the coordinator decides what is missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckInInput {
  pub name:      Option<String>,
  pub id_number: Option<String>,
  pub site:      Option<String>,
  /// A calendar date (`YYYY-MM-DD`); the time of day is stamped on receipt.
  pub time_in:   Option<String>,
  pub time_out:  Option<String>,
  pub notes:     Option<String>,
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn recorded_at_renders_with_millis_and_z() {
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 7).unwrap();
    assert_eq!(encode_recorded_at(at), "2024-03-01T09:05:07.000Z");
    assert_eq!(decode_recorded_at("2024-03-01T09:05:07.000Z"), Some(at));
  }

  #[test]
  fn decode_rejects_garbage() {
    assert_eq!(decode_recorded_at("yesterday"), None);
  }

  #[test]
  fn input_accepts_partial_json() {
    let input: CheckInInput =
      serde_json::from_str(r#"{"name":"Ana","site":"HQ"}"#).unwrap();
    assert_eq!(input.name.as_deref(), Some("Ana"));
    assert!(input.id_number.is_none());
    assert!(input.time_in.is_none());
  }
}
