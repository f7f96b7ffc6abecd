//! Rendering of resolved commit times for the command line.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::times::CommitTimes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    /// Epoch seconds
    Epoch,
    /// RFC 3339, UTC
    Iso,
    /// "3 days ago"
    Relative,
}

/// JSON object mapping each path to its formatted time.
pub fn render(times: &CommitTimes, format: TimeFormat) -> Value {
    let now = Utc::now().timestamp();
    let mut object = Map::with_capacity(times.len());

    for (path, &epoch) in times {
        let value = match format {
            TimeFormat::Epoch => Value::from(epoch),
            TimeFormat::Iso => Value::from(format_iso(epoch)),
            TimeFormat::Relative => Value::from(format_relative_time(epoch, now)),
        };
        object.insert(path.clone(), value);
    }

    Value::Object(object)
}

pub fn format_iso(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| timestamp.to_string())
}

pub fn format_relative_time(timestamp: i64, now: i64) -> String {
    let diff = now - timestamp;

    if diff < 60 {
        "just now".to_string()
    } else if diff < 3600 {
        let mins = diff / 60;
        format!("{} minute{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if diff < 86400 {
        let hours = diff / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else if diff < 2592000 {
        let days = diff / 86400;
        format!("{} day{} ago", days, if days == 1 { "" } else { "s" })
    } else if diff < 31536000 {
        let months = diff / 2592000;
        format!("{} month{} ago", months, if months == 1 { "" } else { "s" })
    } else {
        let years = diff / 31536000;
        format!("{} year{} ago", years, if years == 1 { "" } else { "s" })
    }
}
