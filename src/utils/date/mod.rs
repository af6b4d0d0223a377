// Date utility functions
// Compact, abbreviated duration formatting for the menu-bar label

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;

/// Splits a whole number of seconds into (days, hours, minutes, seconds).
pub fn split_seconds(total_seconds: u64) -> (u64, u64, u64, u64) {
    let days = total_seconds / SECONDS_PER_DAY;
    let hours = (total_seconds % SECONDS_PER_DAY) / SECONDS_PER_HOUR;
    let minutes = (total_seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let seconds = total_seconds % SECONDS_PER_MINUTE;
    (days, hours, minutes, seconds)
}

/// Formats seconds as e.g. `"2d 3h 5s"`.
///
/// Zero-valued units are omitted wherever they fall. A zero duration formats
/// as `"0s"`.
pub fn format_compact_seconds(total_seconds: u64) -> String {
    let (days, hours, minutes, seconds) = split_seconds(total_seconds);
    let parts: Vec<String> = [(days, 'd'), (hours, 'h'), (minutes, 'm'), (seconds, 's')]
        .iter()
        .filter(|(value, _)| *value != 0)
        .map(|(value, unit)| format!("{value}{unit}"))
        .collect();

    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}
