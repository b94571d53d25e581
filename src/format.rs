//! Presentation helpers for times and dates.

use chrono::NaiveDate;

/// Convert a 24-hour token (`"13"` or `"13:00"`) to 12-hour form
/// (`"1:00 PM"`). Only the hour is used. Input that does not start with an
/// hour is returned unchanged.
pub fn to_12_hour(time: &str) -> String {
    let hour_part = time.trim().split(':').next().unwrap_or_default();

    match hour_part.parse::<u32>() {
        Ok(hour) if hour < 24 => {
            let (display, suffix) = match hour {
                0 => (12, "AM"),
                1..=11 => (hour, "AM"),
                12 => (12, "PM"),
                _ => (hour - 12, "PM"),
            };
            format!("{}:00 {}", display, suffix)
        }
        _ => time.to_string(),
    }
}

/// Convert a comma-separated list of times or `start-end` ranges to 12-hour
/// form, e.g. `"11:00-13:00, 17:00"` becomes `"11:00 AM - 1:00 PM, 5:00 PM"`.
pub fn format_busy_periods(periods: &str) -> String {
    periods
        .split(',')
        .map(str::trim)
        .filter(|period| !period.is_empty())
        .map(|period| {
            period
                .split('-')
                .map(|boundary| to_12_hour(boundary.trim()))
                .collect::<Vec<_>>()
                .join(" - ")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Label `date` relative to `today`: `Today`, `Tomorrow`, or e.g.
/// `Friday, October 23`.
pub fn relative_day_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if today.succ_opt() == Some(date) {
        "Tomorrow".to_string()
    } else {
        date.format("%A, %B %-d").to_string()
    }
}
