use chrono::{DateTime, NaiveDateTime, Timelike};

use super::constants::DATETIME_FORMATS;
use crate::error::Result;

/// Parse a logger timestamp. RFC 3339 with an offset is tried first (local
/// wall time is kept), then the formats in [`DATETIME_FORMATS`]. Sub-second
/// precision is dropped.
pub fn parse_datetime(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(truncate_subseconds(dt.naive_local()));
    }

    let mut parsed = NaiveDateTime::parse_from_str(value, DATETIME_FORMATS[0]);
    for format in &DATETIME_FORMATS[1..] {
        if parsed.is_ok() {
            break;
        }
        parsed = NaiveDateTime::parse_from_str(value, format);
    }
    Ok(truncate_subseconds(parsed?))
}

pub fn format_datetime(value: &NaiveDateTime, format: &str) -> String {
    value.format(format).to_string()
}

fn truncate_subseconds(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_nanosecond(0).unwrap_or(dt)
}
