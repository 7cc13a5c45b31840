//! Shared utility functions.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Milliseconds between the unix epoch and the Discord epoch (2015-01-01).
pub const DISCORD_EPOCH_MILLIS: u64 = 1_420_070_400_000;

/// Formats a timestamp for display.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Extracts the creation time encoded in a Discord snowflake.
pub fn snowflake_timestamp(id: u64) -> Option<DateTime<Utc>> {
    let millis = (id >> 22).checked_add(DISCORD_EPOCH_MILLIS)?;
    DateTime::from_timestamp_millis(i64::try_from(millis).ok()?)
}

/// Substitutes `{key}` placeholders in a response template.
///
/// Every occurrence of each placeholder is replaced; unknown placeholders are
/// left untouched.
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |acc, (key, value)| {
            acc.replace(&format!("{{{key}}}"), value)
        })
}

/// Formats a duration as a compact `1d 2h 3m 4s` string.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let (days, hours, minutes, seconds) = (
        total / 86_400,
        (total % 86_400) / 3_600,
        (total % 3_600) / 60,
        total % 60,
    );

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{seconds}s"));
    }
    parts.join(" ")
}
