//! Remaining-time formatting for operator display.
//!
//! Renders the time until the next save as `M:SS.s` — whole minutes, then
//! seconds with one decimal place, half-up rounded and zero-padded below
//! ten. Overdue (negative) remaining time clamps to `0:00.0`.

use chrono::TimeDelta;

/// Format a remaining time as `M:SS.s`.
///
/// Rounding is half-up at the tenths place and carries upward, so 59.96
/// seconds renders as `1:00.0`, never `0:60.0`.
#[must_use]
pub fn format_remaining(remaining: TimeDelta) -> String {
    let millis = remaining.num_milliseconds().max(0);
    let tenths = (millis + 50) / 100;
    let minutes = tenths / 600;
    let tenths = tenths % 600;
    format!("{minutes}:{:02}.{}", tenths / 10, tenths % 10)
}
