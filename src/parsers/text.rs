use crate::error::ParseError;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    // hour-only offsets, as PostgreSQL exports timestamptz
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y/%m/%d %H:%M:%S%.f %z",
    // access logs
    "%d/%b/%Y:%H:%M:%S %z",
    "%a %b %d %H:%M:%S %z %Y",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%d-%b-%Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%b %d %Y %H:%M:%S",
    "%a %b %d %H:%M:%S %Y",
    "%Y%m%dT%H%M%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// Parses free-form date/time text. Values without an offset are taken as UTC.
/// Leap seconds and years outside 1..=9999 are rejected.
pub fn parse(input: &str) -> Result<DateTime<Utc>, ParseError> {
    parse_any(input.trim()).filter(in_range).ok_or(ParseError::UnrecognizedFormat)
}

// chrono keeps `:60` as a sub-second value past 1e9
fn in_range(dt: &DateTime<Utc>) -> bool {
    dt.nanosecond() < 1_000_000_000 && (1..=9999).contains(&dt.year())
}

fn parse_any(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    let naive = strip_utc_marker(s);
    for fmt in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }
    for fmt in DATE_FORMATS {
        if let Some(ndt) = NaiveDate::parse_from_str(naive, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }

    None
}

// "…20Z", "… UTC" and "… GMT" carry no offset beyond UTC itself.
fn strip_utc_marker(s: &str) -> &str {
    for suffix in [" UTC", " GMT", "Z", "z"] {
        if let Some(rest) = s.strip_suffix(suffix) {
            if rest.ends_with(|c: char| c.is_ascii_digit()) {
                return rest.trim_end();
            }
        }
    }
    s
}
