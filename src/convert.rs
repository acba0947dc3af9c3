// src/convert.rs
//
// The closed set of cell conversions a load plan can apply. Blank cells are
// mapped to NULL by `rows::Row` before any parser sees them.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// US month-first forms first; the LIS exports are written by a US locale.
const DATE_FORMATS: &[&str] = &[
    "%m/%d/%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%b %d %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%d-%b-%Y",
    "%m/%d/%y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%y %I:%M:%S %p",
    "%m/%d/%y %H:%M:%S",
];

/// Trim whitespace. The source pads names and descriptions to fixed widths.
pub fn trim(raw: &str) -> String {
    raw.trim().to_string()
}

/// Parse a whole number, tolerating surrounding whitespace.
pub fn parse_integer(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// Parse a calendar date. A trailing time of day is accepted and dropped,
/// since several exports write dates as `1/12/2024 12:00:00 AM`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .find(plausible_year)
        .or_else(|| parse_datetime_only(s).map(|dt| dt.date()))
}

/// Parse a timestamp. A bare date is accepted as midnight.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    parse_datetime_only(s).or_else(|| {
        DATE_FORMATS
            .iter()
            .filter_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
            .find(plausible_year)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    })
}

fn parse_datetime_only(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .find(|dt| plausible_year(&dt.date()))
}

// `%Y` happily reads "24" as the year 24; leave two-digit years to `%y`.
fn plausible_year(d: &NaiveDate) -> bool {
    d.year() >= 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_trim() {
        assert_eq!(trim("  Smith, John   "), "Smith, John");
        assert_eq!(trim("\tX\r\n"), "X");
    }

    #[test]
    fn test_parse_date_month_first() {
        assert_eq!(parse_date("1/12/2024"), Some(date(2024, 1, 12)));
        assert_eq!(parse_date("01/02/2024"), Some(date(2024, 1, 2)));
        assert_eq!(parse_date("12/31/24"), Some(date(2024, 12, 31)));
    }

    #[test]
    fn test_parse_date_other_forms() {
        assert_eq!(parse_date("2024-03-05"), Some(date(2024, 3, 5)));
        assert_eq!(parse_date("Mar 5 2024"), Some(date(2024, 3, 5)));
        assert_eq!(parse_date("March 5, 2024"), Some(date(2024, 3, 5)));
        assert_eq!(parse_date(" 3/5/2024 "), Some(date(2024, 3, 5)));
    }

    #[test]
    fn test_parse_date_drops_time_of_day() {
        assert_eq!(parse_date("1/12/2024 12:00:00 AM"), Some(date(2024, 1, 12)));
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("13/45/2024"), None);
    }

    #[test]
    fn test_parse_datetime() {
        let want = date(2024, 2, 9).and_hms_opt(14, 5, 30).unwrap();
        assert_eq!(parse_datetime("2/9/2024 2:05:30 PM"), Some(want));
        assert_eq!(parse_datetime("2024-02-09 14:05:30"), Some(want));
        assert_eq!(parse_datetime("2024-02-09T14:05:30"), Some(want));
        assert_eq!(
            parse_datetime("2/9/2024"),
            date(2024, 2, 9).and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_datetime("yesterday"), None);
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer(" 42 "), Some(42));
        assert_eq!(parse_integer("4.2"), None);
    }
}
