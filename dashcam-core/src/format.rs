use chrono::{Duration, NaiveDateTime};

/// `MM:SS`, minutes are not wrapped into hours
pub fn format_time(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Wall-clock `HH:MM:SS` of `base` plus `offset_secs`
pub fn format_absolute_time(base: NaiveDateTime, offset_secs: f64) -> String {
    let offset = if offset_secs.is_finite() { offset_secs } else { 0.0 };
    let at = base + Duration::milliseconds((offset * 1000.0) as i64);
    at.format("%H:%M:%S").to_string()
}

/// Human readable duration: `1h 5m 30s`, `2m 15s`, `2m 0s`, `45s`
pub fn format_duration(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes == 0 {
        format!("{}s", secs)
    } else {
        format!("{}m {}s", minutes, secs)
    }
}

/// Clip start as shown in listings, e.g. `Mon, Oct 27, 2025 08:42`
pub fn format_clip_timestamp(at: NaiveDateTime) -> String {
    at.format("%a, %b %-d, %Y %H:%M").to_string()
}

/// Start and end of a detected clip, e.g. `Oct 27, 2025 08:42:37 - 08:51:10`
pub fn format_time_range(start: NaiveDateTime, end: NaiveDateTime) -> String {
    format!(
        "{} - {}",
        start.format("%b %-d, %Y %H:%M:%S"),
        end.format("%H:%M:%S")
    )
}

fn whole_seconds(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    }
}
