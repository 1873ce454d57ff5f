pub mod epoch;
pub mod text;

use crate::dataset::RawValue;
use crate::error::ParseError;
use chrono::{DateTime, Utc};

/// Resolves a raw cell to an instant. `Ok(None)` means the cell was empty.
pub fn parse(value: &RawValue<'_>) -> Result<Option<DateTime<Utc>>, ParseError> {
    match *value {
        RawValue::Missing => Ok(None),
        RawValue::Number(n) if n.is_nan() => Ok(None),
        RawValue::Number(n) => epoch::from_number(n).map(Some),
        RawValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                Ok(None)
            } else if epoch::looks_numeric(s) {
                let n: f64 = s
                    .parse()
                    .map_err(|_| ParseError::InvalidNumber(s.to_string()))?;
                epoch::from_number(n).map(Some)
            } else {
                text::parse(s).map(Some)
            }
        }
    }
}

/// ISO-8601 in UTC with a `Z` suffix. Sub-second digits only when present:
/// six for microsecond values, nine otherwise.
pub fn format_canonical(dt: &DateTime<Utc>) -> String {
    let base = dt.format("%Y-%m-%dT%H:%M:%S");
    match dt.timestamp_subsec_nanos() {
        0 => format!("{base}Z"),
        n if n % 1_000 == 0 => format!("{base}.{:06}Z", n / 1_000),
        n => format!("{base}.{n:09}Z"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(value: RawValue<'_>) -> Option<String> {
        parse(&value).unwrap().map(|dt| format_canonical(&dt))
    }

    #[test]
    fn empty_values_are_none() {
        assert_eq!(canonical(RawValue::Missing), None);
        assert_eq!(canonical(RawValue::Text("")), None);
        assert_eq!(canonical(RawValue::Text("   \t")), None);
        assert_eq!(canonical(RawValue::Number(f64::NAN)), None);
    }

    #[test]
    fn numeric_text_and_native_numbers_agree() {
        let expected = Some("2023-11-14T22:13:20Z".to_string());
        assert_eq!(canonical(RawValue::Text("1700000000")), expected);
        assert_eq!(canonical(RawValue::Text("1700000000000")), expected);
        assert_eq!(canonical(RawValue::Number(1_700_000_000.0)), expected);
        assert_eq!(canonical(RawValue::Number(1_700_000_000_000.0)), expected);
    }

    #[test]
    fn fractional_output_precision() {
        assert_eq!(
            canonical(RawValue::Text("1700000000.5")).as_deref(),
            Some("2023-11-14T22:13:20.500000Z")
        );
        assert_eq!(
            canonical(RawValue::Text("2023-11-14T22:13:20.123456789Z")).as_deref(),
            Some("2023-11-14T22:13:20.123456789Z")
        );
    }

    #[test]
    fn unparseable_text_is_an_error() {
        assert_eq!(
            parse(&RawValue::Text("not-a-date")),
            Err(ParseError::UnrecognizedFormat)
        );
    }

    #[test]
    fn leap_second_and_wide_year_text_are_errors() {
        for raw in ["2016-12-31T23:59:60Z", "+12345-01-01T00:00:00Z"] {
            assert_eq!(parse(&RawValue::Text(raw)), Err(ParseError::UnrecognizedFormat));
        }
    }

    #[test]
    fn infinite_number_is_an_error() {
        assert!(matches!(
            parse(&RawValue::Number(f64::INFINITY)),
            Err(ParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn canonical_output_is_stable() {
        for raw in ["2023-11-14T22:13:20Z", "2023-11-14T22:13:20.250000Z"] {
            assert_eq!(canonical(RawValue::Text(raw)).as_deref(), Some(raw));
        }
    }
}
