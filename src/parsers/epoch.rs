use crate::error::ParseError;
use chrono::{DateTime, Datelike, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// Values strictly above this are epoch milliseconds, the rest epoch seconds.
pub const MILLIS_THRESHOLD: f64 = 1e12;

static NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").expect("numeric pattern compiles"));

pub fn looks_numeric(s: &str) -> bool {
    NUMERIC.is_match(s)
}

/// Magnitude rule used for real conversion.
pub fn from_number(n: f64) -> Result<DateTime<Utc>, ParseError> {
    if n > MILLIS_THRESHOLD {
        from_millis(n)
    } else {
        from_seconds(n)
    }
}

pub fn from_seconds(secs: f64) -> Result<DateTime<Utc>, ParseError> {
    from_micros(secs * 1_000_000.0, secs)
}

pub fn from_millis(millis: f64) -> Result<DateTime<Utc>, ParseError> {
    from_micros(millis * 1_000.0, millis)
}

// Rounds to whole microseconds and keeps to four-digit years.
fn from_micros(micros: f64, original: f64) -> Result<DateTime<Utc>, ParseError> {
    let micros = micros.round();
    if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
        return Err(ParseError::OutOfRange(original));
    }
    DateTime::from_timestamp_micros(micros as i64)
        .filter(|dt| (1..=9999).contains(&dt.year()))
        .ok_or(ParseError::OutOfRange(original))
}

/// Digit-count rule used only to annotate previews: an integer part of 13 or
/// more digits reads as milliseconds, exactly 10 as seconds. Deliberately
/// independent of `from_number`; the two disagree near the threshold.
pub fn preview(s: &str) -> Option<DateTime<Utc>> {
    let num: f64 = s.trim().parse().ok()?;
    if !num.is_finite() {
        return None;
    }
    let digits = (num.trunc() as i64).to_string().len();
    if digits >= 13 {
        from_millis(num).ok()
    } else if digits == 10 {
        from_seconds(num).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::format_canonical;

    fn iso(dt: DateTime<Utc>) -> String {
        format_canonical(&dt)
    }

    #[test]
    fn numeric_pattern() {
        assert!(looks_numeric("1700000000"));
        assert!(looks_numeric("1700000000.25"));
        assert!(!looks_numeric("-1700000000"));
        assert!(!looks_numeric("1e9"));
        assert!(!looks_numeric("17."));
        assert!(!looks_numeric("2023-11-14"));
    }

    #[test]
    fn seconds_and_millis_by_magnitude() {
        assert_eq!(iso(from_number(1_700_000_000.0).unwrap()), "2023-11-14T22:13:20Z");
        assert_eq!(iso(from_number(1_700_000_000_000.0).unwrap()), "2023-11-14T22:13:20Z");
        assert_eq!(iso(from_number(0.0).unwrap()), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn threshold_itself_is_seconds() {
        // 1e12 seconds lands past year 9999.
        assert_eq!(from_number(1e12), Err(ParseError::OutOfRange(1e12)));
        assert_eq!(iso(from_number(1e12 + 1.0).unwrap()), "2001-09-09T01:46:40.001000Z");
    }

    #[test]
    fn preview_uses_digit_count() {
        assert_eq!(iso(preview("1700000000").unwrap()), "2023-11-14T22:13:20Z");
        assert_eq!(iso(preview("1700000000000").unwrap()), "2023-11-14T22:13:20Z");
        // 13 digits: milliseconds here, seconds (and out of range) for real conversion.
        assert_eq!(iso(preview("1000000000000").unwrap()), "2001-09-09T01:46:40Z");
        assert!(from_number(1e12).is_err());
        assert_eq!(preview("170000000"), None);
        assert_eq!(preview("17000000000"), None);
        assert_eq!(preview("2023-11-14"), None);
        assert_eq!(preview("nan"), None);
    }
}
