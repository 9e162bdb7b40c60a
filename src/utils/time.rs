//! Time utilities

use std::time::Duration;

/// Seconds with millisecond precision
pub fn round_to_millis(duration: Duration) -> f64 {
    (duration.as_secs_f64() * 1000.0).round() / 1000.0
}

/// Format milliseconds as a human-readable string
pub fn format_milliseconds(ms: u128) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let minutes = ms / 60_000;
        let seconds = (ms % 60_000) / 1000;
        format!("{}m {}s", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_millis() {
        assert_eq!(round_to_millis(Duration::from_micros(1_234_567)), 1.235);
        assert_eq!(round_to_millis(Duration::from_millis(5)), 0.005);
        assert_eq!(round_to_millis(Duration::ZERO), 0.0);
    }

    #[test]
    fn test_format_milliseconds() {
        assert_eq!(format_milliseconds(500), "500ms");
        assert_eq!(format_milliseconds(1500), "1.50s");
        assert_eq!(format_milliseconds(65000), "1m 5s");
    }
}
