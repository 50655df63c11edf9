//! Centralized duration formatting and parsing.
//!
//! Timers, overlay bars and the respawn override field all speak `M:SS`,
//! so formatting and the strict parser live together here.

/// Format a duration as `M:SS`.
///
/// # Examples
/// ```
/// use eqtrak_types::formatting::format_duration;
/// assert_eq!(format_duration(125), "2:05");
/// assert_eq!(format_duration(59), "0:59");
/// assert_eq!(format_duration(0), "0:00");
/// assert_eq!(format_duration(1620), "27:00");
/// ```
pub fn format_duration(secs: u64) -> String {
    let mins = secs / 60;
    let secs = secs % 60;
    format!("{}:{:02}", mins, secs)
}

/// Format a countdown from fractional seconds as `M:SS`, rounding up so a
/// timer shows `0:01` until it has fully elapsed.
///
/// - Values <= 0: returns the provided `zero_label`
///
/// # Examples
/// ```
/// use eqtrak_types::formatting::format_countdown;
/// assert_eq!(format_countdown(399.2, "0:00"), "6:40");
/// assert_eq!(format_countdown(0.4, "0:00"), "0:01");
/// assert_eq!(format_countdown(0.0, "expired"), "expired");
/// ```
pub fn format_countdown(secs: f32, zero_label: &str) -> String {
    if secs <= 0.0 {
        return zero_label.to_string();
    }
    format_duration(secs.ceil() as u64)
}

/// Parse user-entered `M:SS` text into seconds.
///
/// The shape is strict: any number of minute digits, a colon, and exactly
/// two second digits. Surrounding whitespace is ignored. Anything else
/// (empty, signs, single-digit seconds, overflow) is `None` so callers can
/// fall back to their default.
///
/// # Examples
/// ```
/// use eqtrak_types::formatting::parse_clock_duration;
/// assert_eq!(parse_clock_duration("27:00"), Some(1620));
/// assert_eq!(parse_clock_duration(" 6:40 "), Some(400));
/// assert_eq!(parse_clock_duration("5:5"), None);
/// assert_eq!(parse_clock_duration(""), None);
/// assert_eq!(parse_clock_duration("abc"), None);
/// ```
pub fn parse_clock_duration(input: &str) -> Option<u64> {
    let (mins, secs) = input.trim().split_once(':')?;

    if mins.is_empty() || !mins.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if secs.len() != 2 || !secs.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mins: u64 = mins.parse().ok()?;
    let secs: u64 = secs.parse().ok()?;
    mins.checked_mul(60)?.checked_add(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_long_minutes_and_high_seconds() {
        assert_eq!(parse_clock_duration("120:00"), Some(7200));
        // Seconds are two digits, not range checked
        assert_eq!(parse_clock_duration("1:75"), Some(135));
    }

    #[test]
    fn parse_rejects_malformed_shapes() {
        for input in [":30", "1:", "1:2", "1:234", "-1:00", "1:-0", "1.5:00", "1:00:00", "a:00"] {
            assert_eq!(parse_clock_duration(input), None, "input {input:?}");
        }
    }

    #[test]
    fn parse_rejects_overflow() {
        assert_eq!(parse_clock_duration("99999999999999999999999:00"), None);
        assert_eq!(parse_clock_duration("307445734561825861:00"), None);
    }

    #[test]
    fn countdown_rounds_up_partial_seconds() {
        assert_eq!(format_countdown(60.5, "0:00"), "1:01");
        assert_eq!(format_countdown(-3.0, "done"), "done");
    }
}
