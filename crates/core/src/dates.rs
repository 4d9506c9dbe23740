//! Timestamp handling for record dates.
//!
//! Records store their creation time as an ISO-8601 string produced by the
//! writer. Ordering parses those strings; a value that does not parse is
//! older than every valid timestamp, so it sinks to the end of a newest-first
//! feed. Feed order stays total even when the data is bad.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format `now` the way records store it (`2024-06-17T09:30:00.000Z`).
#[must_use]
pub fn iso_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored record date.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Render a stored date as "Month Day" (e.g. "June 17").
///
/// Returns an empty string for values that do not parse.
#[must_use]
pub fn month_day(value: &str) -> String {
    parse_timestamp(value)
        .map(|dt| dt.format("%B %-d").to_string())
        .unwrap_or_default()
}
