//! Calendar helpers: filename stamps, relative ages and export timestamps.

use std::fmt::Display;

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};

use slawatch_types::Timestamp;

/// Compact calendar-date stamp, e.g. `20210424`.
pub fn format_date_ymd<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    dt.format("%Y%m%d").to_string()
}

/// Date stamp with the wall-clock time, e.g. `20210424-091500`.
pub fn format_date_ymdhms<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    dt.format("%Y%m%d-%H%M%S").to_string()
}

pub fn now() -> Timestamp {
    Utc::now()
}

pub fn days_ago(days: i64) -> Timestamp {
    now() - Duration::days(days)
}

pub fn hours_ago(hours: i64) -> Timestamp {
    now() - Duration::hours(hours)
}

/// Approximate age of `then` as English text, e.g. "3 hours ago".
///
/// Uses the largest unit with at least one whole step; ages above a week
/// are expressed in weeks instead of days. Future timestamps read as
/// "0 seconds ago".
pub fn past_date_relative(then: Timestamp, now: Timestamp) -> String {
    let seconds = (now - then).num_milliseconds() as f64 / 1000.0;
    let minutes = seconds / 60.0;
    let hours = minutes / 60.0;
    let days = hours / 24.0;
    let months = days / (365.0 / 12.0);
    let years = months / 12.0;

    let (mut unit, mut value) = if years.floor() > 0.0 {
        ("year", years)
    } else if months.floor() > 0.0 {
        ("month", months)
    } else if days.floor() > 0.0 {
        ("day", days)
    } else if hours.floor() > 0.0 {
        ("hour", hours)
    } else if minutes.floor() > 0.0 {
        ("minute", minutes)
    } else if seconds.floor() > 0.0 {
        ("second", seconds)
    } else {
        ("second", 0.0)
    };

    if unit == "day" && value > 7.0 {
        unit = "week";
        value /= 7.0;
    }

    let n = value.round() as i64;
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

/// Long-form `M/D/YYYY h:mm:ss AM` rendering of epoch milliseconds in `tz`.
///
/// The output never contains a comma, so it is safe as a CSV cell.
pub fn export_timestamp<Tz: TimeZone>(ms: i64, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    match tz.timestamp_millis_opt(ms) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
            dt.format("%-m/%-d/%Y %-I:%M:%S %p").to_string()
        }
        LocalResult::None => String::new(),
    }
}

/// Parse a command-line timestamp.
///
/// Accepts RFC 3339 (`2021-04-24T09:00:00Z`), or a wall-clock
/// `YYYY-MM-DD HH:MM[:SS]` / `YYYY-MM-DD` read in `tz`.
pub fn parse_timestamp_in<Tz: TimeZone>(s: &str, tz: &Tz) -> Option<Timestamp> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

/// Parse a command-line timestamp in local time.
pub fn parse_timestamp(s: &str) -> Option<Timestamp> {
    parse_timestamp_in(s, &Local)
}
