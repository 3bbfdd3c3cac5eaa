//! Permissive date parsing over mixed textual formats.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::dataset::Value;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m/%d/%y",
    "%m-%d-%Y",
    "%d.%m.%Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%b-%Y",
    "%d-%b-%y",
    "%a, %d %b %Y",
];

// Formats with no day component; parsed with a day of 1 appended.
const MONTH_FORMATS: &[&str] = &["%b %Y %d", "%B %Y %d", "%b-%Y %d", "%B, %Y %d"];

static YEAR_MONTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})[-/](\d{1,2})$").unwrap());
static MONTH_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{4})$").unwrap());
static COMPACT_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{8}$").unwrap());

/// Parse a cell into a calendar date-time, whatever its stored type.
///
/// Date-only values land at midnight. Missing, numeric and boolean cells are not dates.
pub fn parse_value(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Date(d) => d.and_hms_opt(0, 0, 0),
        Value::DateTime(dt) => Some(*dt),
        Value::Text(s) => parse_text(s),
        _ => None,
    }
}

/// Parse free text into a date-time.
pub fn parse_text(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }

    if let Some(dt) = DATETIME_FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(text, fmt)
            .ok()
            .filter(|dt| plausible(dt.date()))
    }) {
        return Some(dt);
    }

    parse_date(text).and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    if COMPACT_DATE.is_match(text) {
        return NaiveDate::parse_from_str(text, "%Y%m%d")
            .ok()
            .filter(|d| plausible(*d));
    }

    if let Some(caps) = YEAR_MONTH.captures(text) {
        return first_of_month(&caps[1], &caps[2]);
    }

    if let Some(caps) = MONTH_YEAR.captures(text) {
        return first_of_month(&caps[2], &caps[1]);
    }

    if let Some(date) = DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(text, fmt)
            .ok()
            .filter(|d| plausible(*d))
    }) {
        return Some(date);
    }

    let with_day = format!("{text} 1");
    MONTH_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(&with_day, fmt)
            .ok()
            .filter(|d| plausible(*d))
    })
}

/// `%Y` accepts any digit count, so "1/12/23" would otherwise parse as year 1.
fn plausible(date: NaiveDate) -> bool {
    (1000..=9999).contains(&date.year())
}

fn first_of_month(year: &str, month: &str) -> Option<NaiveDate> {
    let year = year.parse::<i32>().ok()?;
    let month = month.parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1).filter(|d| plausible(*d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn ymd(text: &str) -> (i32, u32, u32) {
        let dt = parse_text(text).unwrap_or_else(|| panic!("failed to parse {text:?}"));
        (dt.year(), dt.month(), dt.day())
    }

    #[test]
    fn test_mixed_formats() {
        assert_eq!(ymd("2023-01-15"), (2023, 1, 15));
        assert_eq!(ymd("2023/01/15"), (2023, 1, 15));
        assert_eq!(ymd("01/15/2023"), (2023, 1, 15));
        assert_eq!(ymd("1/15/23"), (2023, 1, 15));
        assert_eq!(ymd("1/12/23"), (2023, 1, 12));
        assert_eq!(ymd("15-Jan-23"), (2023, 1, 15));
        assert_eq!(ymd("20230115"), (2023, 1, 15));
        assert_eq!(ymd("Jan 15 2023"), (2023, 1, 15));
        assert_eq!(ymd("January 15, 2023"), (2023, 1, 15));
        assert_eq!(ymd("15 Jan 2023"), (2023, 1, 15));
    }

    #[test]
    fn test_year_month_periods() {
        assert_eq!(ymd("2023-01"), (2023, 1, 1));
        assert_eq!(ymd("2023/6"), (2023, 6, 1));
        assert_eq!(ymd("06/2023"), (2023, 6, 1));
        assert_eq!(ymd("Mar 2023"), (2023, 3, 1));
        assert_eq!(ymd("March 2023"), (2023, 3, 1));
    }

    #[test]
    fn test_timestamps() {
        let dt = parse_text("2023-01-15T10:30:00Z").unwrap();
        assert_eq!(dt.hour(), 10);
        let dt = parse_text("2023-01-15 08:05:09").unwrap();
        assert_eq!(dt.minute(), 5);
    }

    #[test]
    fn test_rejects_non_dates() {
        assert!(parse_text("not a date").is_none());
        assert!(parse_text("N/A").is_none());
        assert!(parse_text("2023-13").is_none());
        assert!(parse_text("").is_none());
        assert!(parse_value(&Value::Integer(20230115)).is_none());
    }

    #[test]
    fn test_implausible_years_rejected() {
        assert!(parse_text("0000-01").is_none());
        assert!(parse_text("01/0000").is_none());
        assert!(parse_text("00000115").is_none());
        assert_eq!(ymd("2023-07"), (2023, 7, 1));
    }
}
