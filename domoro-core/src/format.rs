//! Formatting helpers shared by display surfaces.

use chrono::Duration;

/// Format a number of seconds as `HH:MM:SS`.
pub fn format_hms(total_secs: i64) -> String {
    let total_secs = total_secs.max(0);
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Format a [`Duration`] as `HH:MM:SS`. Negative durations render as zero.
pub fn format_duration(duration: Duration) -> String {
    format_hms(duration.num_seconds())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(59), "00:00:59");
        assert_eq!(format_hms(61), "00:01:01");
        assert_eq!(format_hms(3661), "01:01:01");
        assert_eq!(format_hms(36_000), "10:00:00");
    }

    #[test]
    fn test_negative_clamps_to_zero() {
        assert_eq!(format_hms(-5), "00:00:00");
        assert_eq!(format_duration(Duration::seconds(-5)), "00:00:00");
    }
}
