use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::timestamp::parse_timestamp;

/// Elapsed time of a completed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionDuration {
    Known(u64),
    /// Negative span or an unparseable endpoint.
    Unknown,
}

impl SessionDuration {
    pub fn between(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        let secs = (end - start).num_seconds();
        u64::try_from(secs).map_or(Self::Unknown, Self::Known)
    }

    pub fn as_secs(&self) -> Option<u64> {
        match self {
            Self::Known(secs) => Some(*secs),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for SessionDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = match self {
            Self::Known(secs) => *secs,
            Self::Unknown => return f.write_str("Unknown"),
        };
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;

        if hours > 0 {
            write!(f, "{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            write!(f, "{}m {}s", minutes, seconds)
        } else {
            write!(f, "{}s", seconds)
        }
    }
}

/// Duration between two textual timestamps resolved against `year`.
/// Never fails: bad input yields [`SessionDuration::Unknown`].
pub fn duration_between(start: &str, end: &str, year: i32) -> SessionDuration {
    match (parse_timestamp(start, year), parse_timestamp(end, year)) {
        (Ok(start), Ok(end)) => SessionDuration::between(start, end),
        _ => SessionDuration::Unknown,
    }
}
