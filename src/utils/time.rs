//! Time and timestamp utilities

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, TimeZone};

/// Default display format: wall clock time with milliseconds, no date
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%H:%M:%S%.3f";

/// Whether `format` is a valid chrono strftime pattern
pub fn is_valid_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Format the current local time with `format`
pub fn current_timestamp(format: &str) -> String {
    format_timestamp(&Local::now(), format)
}

/// Format `time` with `format`, falling back to [`DEFAULT_TIMESTAMP_FORMAT`]
/// when the pattern cannot be rendered.
pub fn format_timestamp<Tz>(time: &DateTime<Tz>, format: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::with_capacity(16);
    if write!(out, "{}", time.format(format)).is_ok() {
        return out;
    }
    out.clear();
    let _ = write!(out, "{}", time.format(DEFAULT_TIMESTAMP_FORMAT));
    out
}
