//! Human-readable sizes and relative dates for asset cards.

use chrono::{DateTime, Utc};

const SIZE_UNITS: [&str; 3] = ["B", "KB", "MB"];

/// Format a byte count as `B`, `KB`, or `MB` with at most one decimal.
///
/// A trailing `.0` is dropped, so 1024 bytes is `"1 KB"` and 1536 bytes is
/// `"1.5 KB"`. Sizes beyond the megabyte range stay in megabytes.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0} {}", SIZE_UNITS[unit])
    } else {
        format!("{rounded:.1} {}", SIZE_UNITS[unit])
    }
}

/// Format an upload time relative to `now`.
///
/// Under a minute is "Just now", then minutes, hours, and days up to a
/// week; anything older shows the month and day (e.g. "Jan 5").
pub fn format_date(uploaded: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(uploaded);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days < 7 {
        format!("{days}d ago")
    } else {
        uploaded.format("%b %-d").to_string()
    }
}

/// Short size label for a byte ceiling, such as "2MB" for 2 MiB.
pub fn format_limit(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format_file_size(bytes)
    }
}
