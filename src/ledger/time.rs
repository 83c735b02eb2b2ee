//! Timestamp parsing and formatting for bet records.
//!
//! Bets carry a local date-time with no zone. Inputs follow ISO-8601 with
//! minute or sub-second precision; a bare date means midnight.

use chrono::{NaiveDate, NaiveDateTime};

use crate::ledger::error::{LedgerError, LedgerResult};

/// Format used when a bet timestamp is sent back to callers.
pub const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Human-facing format used in listings and statistics.
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M";

const ACCEPTED_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a caller-supplied bet timestamp.
pub fn parse_timestamp(raw: &str) -> LedgerResult<NaiveDateTime> {
    let raw = raw.trim();

    for format in ACCEPTED_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(parsed);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| LedgerError::Validation(format!("malformed timestamp: '{}'", raw)))
}

pub fn format_wire(timestamp: &NaiveDateTime) -> String {
    timestamp.format(WIRE_FORMAT).to_string()
}

pub fn format_display(timestamp: &NaiveDateTime) -> String {
    timestamp.format(DISPLAY_FORMAT).to_string()
}
