//! Display helpers for remaining time

/// Remaining time at or below which the display is flagged as running low
pub const LOW_TIME_THRESHOLD_SECONDS: u64 = 300;

/// Render seconds as `MM:SS`, minutes zero-padded to at least two digits
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Check whether the countdown should be shown as running low
pub fn is_low_time(seconds: u64) -> bool {
    seconds > 0 && seconds <= LOW_TIME_THRESHOLD_SECONDS
}
