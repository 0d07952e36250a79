//! Timestamp parsing for dataset time columns.
//!
//! Values with an offset are converted to UTC; naive values are taken as
//! UTC already. Anything unparseable becomes `None` and the row is
//! dropped by the cleaner.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Formats carrying an explicit UTC offset
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
];

/// Formats without an offset
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Date-only formats, read as midnight UTC
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a timestamp string, normalising to UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_offset_converted_to_utc() {
        let parsed = parse_timestamp("2024-03-01T10:00:00+07:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 3, 0, 0).unwrap());

        let parsed = parse_timestamp("2024-03-01 10:00:00+07:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 3, 0, 0).unwrap());
    }

    #[test]
    fn test_zulu_and_fraction() {
        let parsed = parse_timestamp("2024-03-01T10:15:30.250Z").unwrap();
        assert_eq!(parsed.timestamp(), Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 30).unwrap().timestamp());
    }

    #[test]
    fn test_naive_taken_as_utc() {
        assert_eq!(
            parse_timestamp("2024-03-01 23:00:00").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 23, 0, 0).unwrap()
        );
        assert_eq!(
            parse_timestamp("2024-03-01T23:05").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 23, 5, 0).unwrap()
        );
    }

    #[test]
    fn test_date_only_is_midnight() {
        assert_eq!(
            parse_timestamp("2024-03-01").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_garbage_is_none() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("   "), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2024-13-45"), None);
    }
}
