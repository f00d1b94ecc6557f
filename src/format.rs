//! Display labels for dates and numbers on store and survey pages.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};

use crate::query_params::js_number;

/// Japan Standard Time, in seconds east of UTC
pub const JST_OFFSET_SECS: i32 = 9 * 3600;

/// Placeholder for a value that cannot be shown
pub const EMPTY_LABEL: &str = "-";

/// Offset used for comment timestamps.
pub fn tokyo_offset() -> FixedOffset {
    FixedOffset::east_opt(JST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Format a `YYYY-MM` visited period as `YYYY年M月`.
///
/// Anything that does not look like a year and a numeric month is shown as-is.
pub fn format_visited_period(value: &str) -> String {
    if value.is_empty() {
        return EMPTY_LABEL.to_string();
    }

    let mut parts = value.split('-');
    let (Some(year), Some(month)) = (parts.next(), parts.next()) else {
        return value.to_string();
    };
    if year.is_empty() || month.is_empty() {
        return value.to_string();
    }

    match js_number(month) {
        Some(month_number) => format!("{}年{}月", year, month_number),
        None => value.to_string(),
    }
}

/// Format a comment timestamp as `YYYY/MM/DD HH:MM` in Japan time.
pub fn format_comment_time(value: &str) -> String {
    format_comment_time_in(value, tokyo_offset())
}

/// Format a comment timestamp as `YYYY/MM/DD HH:MM` in `offset`.
///
/// Accepts RFC 3339, or a bare `YYYY-MM-DD HH:MM:SS` which is taken to be
/// local to `offset` already. Unparsable input is returned unchanged.
pub fn format_comment_time_in(value: &str, offset: FixedOffset) -> String {
    let local = match DateTime::parse_from_rfc3339(value.trim()) {
        Ok(dt) => dt.with_timezone(&offset),
        Err(_) => {
            let naive = NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%d %H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%dT%H:%M:%S"));
            match naive.ok().and_then(|n| offset.from_local_datetime(&n).single()) {
                Some(dt) => dt,
                None => return value.to_string(),
            }
        }
    };
    local.format("%Y/%m/%d %H:%M").to_string()
}

/// Format a number with at most one decimal place (`3`, `3.5`, `-`).
pub fn format_decimal1(value: Option<f64>) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return EMPTY_LABEL.to_string();
    };

    // half-up rounding, matching the web client
    let rounded = (value * 10.0 + 0.5).floor() / 10.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    if rounded.fract() == 0.0 {
        return format!("{:.0}", rounded);
    }
    format!("{:.1}", rounded)
}

/// Wait-time label as shown on cards (`1.5時間`).
pub fn format_wait_time(hours: Option<f64>) -> String {
    match hours.filter(|h| h.is_finite()) {
        Some(h) => format!("{}時間", format_decimal1(Some(h))),
        None => EMPTY_LABEL.to_string(),
    }
}
