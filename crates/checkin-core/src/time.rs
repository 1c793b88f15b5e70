//! Combines a submitted calendar date with the server's wall-clock time.
//!
//! Clients only pick a date; the time of day is stamped on receipt rather
//! than taken from the client's clock.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::{Error, Result};

/// `DD/MM/YYYY HH:MM:SS`, 24-hour clock, zero padded.
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Combine `input`'s calendar date with the current local time.
///
/// Blank input yields an empty string: "no time submitted" is not an error.
pub fn combine(input: &str) -> Result<String> {
  combine_at(input, Local::now().time())
}

/// [`combine`] with the clock reading supplied by the caller.
pub fn combine_at(input: &str, now: NaiveTime) -> Result<String> {
  let input = input.trim();
  if input.is_empty() {
    return Ok(String::new());
  }

  let date = parse_date(input).ok_or_else(|| {
    Error::validation(format!("invalid date {input:?}, expected YYYY-MM-DD"))
  })?;

  Ok(date.and_time(now).format(DISPLAY_FORMAT).to_string())
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM[:SS[.f]]` and RFC 3339. Only the
/// date as written is kept.
fn parse_date(input: &str) -> Option<NaiveDate> {
  if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
    return Some(date);
  }
  if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
    return Some(dt.date_naive());
  }
  ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
    .map(|dt| dt.date())
}

#[cfg(test)]
mod tests {
  use chrono::Timelike as _;

  use super::*;
  use crate::ErrorKind;

  fn at(h: u32, m: u32, s: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, s).unwrap()
  }

  #[test]
  fn empty_input_is_the_no_time_sentinel() {
    assert_eq!(combine("").unwrap(), "");
    assert_eq!(combine("   ").unwrap(), "");
  }

  #[test]
  fn date_takes_the_supplied_clock() {
    let out = combine_at("2024-03-01", at(14, 5, 9)).unwrap();
    assert_eq!(out, "01/03/2024 14:05:09");
  }

  #[test]
  fn fields_are_zero_padded_on_a_24_hour_clock() {
    let out = combine_at("2024-12-09", at(7, 0, 3)).unwrap();
    assert_eq!(out, "09/12/2024 07:00:03");
    let out = combine_at("2024-12-09", at(23, 59, 59)).unwrap();
    assert_eq!(out, "09/12/2024 23:59:59");
  }

  #[test]
  fn time_part_of_input_is_discarded() {
    let out = combine_at("2024-03-01T00:00", at(8, 30, 0)).unwrap();
    assert_eq!(out, "01/03/2024 08:30:00");
    let out = combine_at("2024-03-01T23:10:44.120", at(8, 30, 0)).unwrap();
    assert_eq!(out, "01/03/2024 08:30:00");
  }

  #[test]
  fn rfc3339_keeps_the_date_as_written() {
    let out = combine_at("2024-03-01T23:30:00-05:00", at(10, 0, 0)).unwrap();
    assert_eq!(out, "01/03/2024 10:00:00");
  }

  #[test]
  fn unparseable_date_is_a_validation_error() {
    let err = combine_at("next tuesday", at(10, 0, 0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let err = combine_at("2024-02-30", at(10, 0, 0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
  }

  #[test]
  fn combine_uses_the_clock_at_invocation_not_midnight() {
    let before = Local::now().time().with_nanosecond(0).unwrap();
    let out = combine("2024-03-01").unwrap();
    let after = Local::now().time();

    let (date, time) = out.split_once(' ').unwrap();
    assert_eq!(date, "01/03/2024");
    let stamped = NaiveTime::parse_from_str(time, "%H:%M:%S").unwrap();
    // Tolerate the clock crossing midnight while the test runs.
    if before <= after {
      assert!(stamped >= before && stamped <= after, "{stamped} not in [{before}, {after}]");
    }
  }
}
