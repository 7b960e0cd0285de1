//! Duration-text parsing and pace math.

use crate::error::StoreError;

/// Parses user-entered `MM:SS` or `HH:MM:SS` text into whole seconds.
///
/// Minutes may exceed 59 in the two-part form (`90:00` is ninety minutes);
/// in the three-part form minutes and seconds must both stay below 60.
pub fn parse_duration_text(text: &str) -> Result<u32, StoreError> {
    let malformed = || StoreError::MalformedDuration {
        text: text.to_string(),
    };
    let field = |part: &str| -> Option<u32> {
        if part.is_empty() || !part.bytes().all(|byte| byte.is_ascii_digit()) {
            return None;
        }
        part.parse().ok()
    };

    let parts: Vec<&str> = text.trim().split(':').collect();
    let seconds = match parts.as_slice() {
        [minutes, seconds] => {
            let minutes = field(minutes).ok_or_else(malformed)?;
            let seconds = field(seconds).filter(|value| *value < 60).ok_or_else(malformed)?;
            minutes * 60 + seconds
        }
        [hours, minutes, seconds] => {
            let hours = field(hours).ok_or_else(malformed)?;
            let minutes = field(minutes).filter(|value| *value < 60).ok_or_else(malformed)?;
            let seconds = field(seconds).filter(|value| *value < 60).ok_or_else(malformed)?;
            hours * 3600 + minutes * 60 + seconds
        }
        _ => return Err(malformed()),
    };

    Ok(seconds)
}

/// Seconds per 100 m: `duration / (distance / 100)`. Zero when either input
/// is zero, never a division by zero.
#[must_use]
pub fn compute_pace(distance: u32, duration: u32) -> f64 {
    if distance == 0 || duration == 0 {
        return 0.0;
    }

    f64::from(duration) / (f64::from(distance) / 100.0)
}

/// Renders a pace in seconds per 100 m as `M:SS` for display.
#[must_use]
pub fn format_pace(pace: f64) -> String {
    if pace <= 0.0 {
        return "--:--".to_string();
    }

    let total = pace.round() as u32;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::{compute_pace, format_pace, parse_duration_text};
    use crate::error::StoreError;

    #[test]
    fn parses_minutes_and_seconds() {
        assert_eq!(
            parse_duration_text("25:30").expect("MM:SS should parse"),
            1530
        );
        assert_eq!(
            parse_duration_text("90:00").expect("large minute field should parse"),
            5400
        );
    }

    #[test]
    fn parses_hours_minutes_and_seconds() {
        assert_eq!(
            parse_duration_text("1:02:03").expect("HH:MM:SS should parse"),
            3723
        );
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(
            parse_duration_text(" 30:00 ").expect("padded text should parse"),
            1800
        );
    }

    #[test]
    fn rejects_malformed_text() {
        for text in ["", "1800", "a:b", "25:-1", "25:60", "1:60:00", "1:2:3:4"] {
            let error = parse_duration_text(text).expect_err("malformed text must fail");
            assert!(matches!(error, StoreError::MalformedDuration { .. }), "{text}");
        }
    }

    #[test]
    fn pace_for_typical_swim() {
        assert_eq!(compute_pace(1500, 1800), 120.0);
    }

    #[test]
    fn pace_is_zero_for_zero_inputs() {
        assert_eq!(compute_pace(0, 1800), 0.0);
        assert_eq!(compute_pace(1500, 0), 0.0);
    }

    #[test]
    fn formats_pace_as_minutes_and_seconds() {
        assert_eq!(format_pace(120.0), "2:00");
        assert_eq!(format_pace(95.4), "1:35");
        assert_eq!(format_pace(0.0), "--:--");
    }
}
