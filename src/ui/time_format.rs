use chrono::{DateTime, Datelike, Duration, Local};
use chrono_humanize::HumanTime;

/// Format a message timestamp for the right-hand "when" column.
/// - <5min: humanized ("just now", "2 minutes ago")
/// - Today: "9:39 PM"
/// - Yesterday: "Yesterday, 9:39 PM"
/// - Older: "6/16/25, 8:30 AM"
pub fn format_message_timestamp(dt: DateTime<Local>, now: DateTime<Local>) -> String {
    let duration = now.signed_duration_since(dt);
    if duration >= Duration::zero() && duration < Duration::minutes(5) {
        HumanTime::from(dt - now).to_string()
    } else if dt.date_naive() == now.date_naive() {
        dt.format("%-I:%M %p").to_string()
    } else if dt.date_naive() == (now - Duration::days(1)).date_naive() {
        format!("Yesterday, {}", dt.format("%-I:%M %p"))
    } else {
        dt.format("%-m/%-d/%y, %-I:%M %p").to_string()
    }
}

/// Full timestamp shown on hover, e.g. "Sunday, June 16, 2025 8:30:05 AM".
pub fn format_full_timestamp(dt: DateTime<Local>) -> String {
    dt.format("%A, %B %-d, %Y %-I:%M:%S %p").to_string()
}

/// Text of the date-header entry inserted at a day boundary (e.g., "June 16th, 2025").
pub fn format_date_delimiter(dt: DateTime<Local>) -> String {
    let day = dt.day();
    let suffix = match day {
        1 | 21 | 31 => "st",
        2 | 22 => "nd",
        3 | 23 => "rd",
        _ => "th",
    };
    format!("{} {}{}, {}", dt.format("%B"), day, suffix, dt.year())
}

/// True when both instants fall on different local calendar days.
pub fn is_different_day(a: DateTime<Local>, b: DateTime<Local>) -> bool {
    a.date_naive() != b.date_naive()
}
