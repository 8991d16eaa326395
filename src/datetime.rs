//! Date/time utilities for imgstation.

use std::time::SystemTime;

use chrono::{DateTime, NaiveDateTime, Utc};

/// Convert a SQLite datetime string (stored as UTC) to RFC 3339.
///
/// Strings that are not in SQLite format are returned unchanged.
///
/// # Examples
///
/// ```
/// use imgstation::datetime::to_rfc3339;
///
/// assert_eq!(to_rfc3339("2024-01-15 10:30:00"), "2024-01-15T10:30:00Z");
/// ```
pub fn to_rfc3339(datetime_str: &str) -> String {
    match NaiveDateTime::parse_from_str(datetime_str, "%Y-%m-%d %H:%M:%S") {
        Ok(naive) => naive.and_utc().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        Err(_) => datetime_str.to_string(),
    }
}

/// Format a system time as an HTTP date (RFC 7231 IMF-fixdate).
pub fn http_date(time: SystemTime) -> String {
    let dt: DateTime<Utc> = time.into();
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_to_rfc3339() {
        assert_eq!(to_rfc3339("2024-01-15 10:30:00"), "2024-01-15T10:30:00Z");
        assert_eq!(to_rfc3339("2024-12-31 23:59:59"), "2024-12-31T23:59:59Z");
    }

    #[test]
    fn test_to_rfc3339_passthrough() {
        assert_eq!(to_rfc3339("not a date"), "not a date");
        assert_eq!(
            to_rfc3339("2024-01-15T10:30:00Z"),
            "2024-01-15T10:30:00Z"
        );
    }

    #[test]
    fn test_http_date() {
        let time = SystemTime::UNIX_EPOCH + Duration::from_secs(784_111_777);
        assert_eq!(http_date(time), "Sun, 06 Nov 1994 08:49:37 GMT");
    }
}
