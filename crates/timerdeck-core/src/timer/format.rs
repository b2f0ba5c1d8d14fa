//! Duration text codec.
//!
//! Accepts `SS`, `MM:SS` and `HH:MM:SS`; renders `MM:SS` below one hour
//! and `HH:MM:SS` from one hour up.

/// Parse free-form duration text into whole seconds.
///
/// Segments that are empty or not numeric count as 0. More than three
/// segments is invalid and yields 0, which callers must reject since it
/// is indistinguishable from "unparseable".
pub fn parse_duration(text: &str) -> u64 {
    let parts: Vec<u64> = text.split(':').map(parse_segment).collect();

    match parts.as_slice() {
        [secs] => *secs,
        [mins, secs] => mins.saturating_mul(60).saturating_add(*secs),
        [hours, mins, secs] => hours
            .saturating_mul(3600)
            .saturating_add(mins.saturating_mul(60))
            .saturating_add(*secs),
        _ => 0,
    }
}

/// Leading decimal digits of a segment, ignoring surrounding whitespace.
fn parse_segment(segment: &str) -> u64 {
    segment
        .trim()
        .chars()
        .map_while(|c| c.to_digit(10))
        .fold(0u64, |acc, d| acc.saturating_mul(10).saturating_add(d as u64))
}

/// Render whole seconds as `MM:SS`, or `HH:MM:SS` once hours are non-zero.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

/// 0.0 .. 100.0 elapsed share of `total`.
pub fn progress_percentage(remaining: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let elapsed = total.saturating_sub(remaining) as f64;
    (elapsed / total as f64 * 100.0).max(0.0)
}
