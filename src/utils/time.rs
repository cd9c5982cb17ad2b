//! Time formatting utilities

use std::time::Duration;

/// Format a capture position as `m:ss`.
///
/// Minutes are `floor(seconds / 60)` and are not wrapped into hours, seconds
/// are `floor(seconds % 60)` zero-padded to two digits. Negative or
/// non-finite input formats as `0:00`.
pub fn format_timestamp(seconds: f64) -> String {
    let seconds = if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    };
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{}:{:02}", minutes, secs)
}

/// Format an elapsed duration for log output
pub fn format_elapsed(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    let milliseconds = duration.subsec_millis();

    format!("{:02}:{:02}.{:03}", minutes, seconds, milliseconds)
}
