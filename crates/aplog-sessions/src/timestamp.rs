//! Year-less access-point timestamps such as `Mon Jan 02 10:00:00`.
//!
//! Log lines carry no year, so every timestamp in a run is resolved against
//! one assumed year. Logs that cross a year boundary sort incorrectly; there
//! is no rollover handling.

use std::ops::RangeInclusive;

use chrono::{NaiveDateTime, ParseError};
use lazy_static::lazy_static;
use regex::Regex;

/// Year used when none is configured. A leap year, so `Feb 29` resolves.
pub const DEFAULT_YEAR: i32 = 2000;

/// Assumed years that resolve. `%Y` only reads up to four unsigned digits.
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 1..=9999;

const PARSE_FORMAT: &str = "%Y %b %d %H:%M:%S";

lazy_static! {
    static ref TIMESTAMP_RE: Regex =
        Regex::new(r"\b[A-Za-z]{3} [A-Za-z]{3} \d{1,2} \d{1,2}:\d{2}:\d{2}\b")
            .expect("timestamp pattern is valid");
}

/// Find the first `weekday month day HH:MM:SS` substring in a line.
pub fn find_timestamp(line: &str) -> Option<&str> {
    TIMESTAMP_RE.find(line).map(|m| m.as_str())
}

/// Resolve a textual timestamp against `year`.
///
/// The weekday is ignored since it cannot be checked against an assumed year.
pub fn parse_timestamp(text: &str, year: i32) -> Result<NaiveDateTime, ParseError> {
    let text = text.trim();
    let without_weekday = text.split_once(' ').map(|(_, rest)| rest).unwrap_or(text);
    NaiveDateTime::parse_from_str(&format!("{} {}", year, without_weekday), PARSE_FORMAT)
}
