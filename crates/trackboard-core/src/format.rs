//! Display formatting for timestamps and metric values.

use chrono::{Local, NaiveDateTime, TimeZone};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats a millisecond epoch timestamp as local wall-clock time.
///
/// A missing or zero timestamp renders as an empty string.
pub fn format_timestamp_millis(ms: Option<i64>) -> String {
    format_timestamp_millis_in(ms, &Local)
}

pub fn format_timestamp_millis_in<Tz>(ms: Option<i64>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match ms {
        Some(ms) if ms != 0 => tz
            .timestamp_millis_opt(ms)
            .single()
            .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// Parses a string produced by [`format_timestamp_millis_in`] back into
/// milliseconds since the epoch. Ambiguous local times resolve to the
/// earliest instant.
pub fn parse_timestamp_millis_in<Tz: TimeZone>(text: &str, tz: &Tz) -> Option<i64> {
    let naive = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).ok()?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp_millis())
}

pub fn parse_timestamp_millis(text: &str) -> Option<i64> {
    parse_timestamp_millis_in(text, &Local)
}

/// Formats a metric value; whole numbers keep one decimal so they read as
/// floats.
pub fn format_metric(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}
