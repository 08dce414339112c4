//! Date helpers for the list views: timestamp parsing, filter ranges and the
//! display format used on event cards.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt::Display;

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").unwrap());
static MONTH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(0[1-9]|1[0-2])$").unwrap());
static ISO_DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Month names used by the month dropdown and the card date format
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Parse a timestamp as the data service returns it.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.f]` (read as UTC) or a bare
/// `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    // Postgres renders timestamptz with a short offset such as `+00`
    if let Ok(parsed) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Serde adapter for timestamp columns
pub mod timestamp {
    use super::parse_timestamp;
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw)))
    }
}

pub fn is_valid_year(value: &str) -> bool {
    YEAR_RE.is_match(value)
}

pub fn is_valid_month(value: &str) -> bool {
    MONTH_RE.is_match(value)
}

pub fn is_valid_iso_date(value: &str) -> bool {
    ISO_DATE_RE.is_match(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Half-open range `[year-01-01, year+1-01-01)` as ISO date bounds
pub fn year_range(year: i32) -> (String, String) {
    (format!("{:04}-01-01", year), format!("{:04}-01-01", year + 1))
}

/// Half-open range covering one month; December rolls over into January of
/// the next year.
pub fn month_range(year: i32, month: u32) -> (String, String) {
    let start = format!("{:04}-{:02}-01", year, month);
    let end = if month >= 12 {
        format!("{:04}-01-01", year + 1)
    } else {
        format!("{:04}-{:02}-01", year, month + 1)
    };
    (start, end)
}

/// `YYYY-MM-DD` of the given instant, the day boundary used for upcoming/past
pub fn day_string(now: &DateTime<Utc>) -> String {
    now.format("%Y-%m-%d").to_string()
}

/// An event counts as upcoming from its start time onwards
pub fn is_upcoming(event_date: &DateTime<Utc>, now: &DateTime<Utc>) -> bool {
    event_date >= now
}

/// Card date format, e.g. `05 March 2025 • 6:00 PM`
pub fn format_date_time<Tz>(value: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("{} • {}", value.format("%d %B %Y"), value.format("%-I:%M %p"))
}

/// Options of the year dropdown: this year and the five before it, newest first
pub fn year_options(current_year: i32) -> Vec<i32> {
    (current_year - 5..=current_year).rev().collect()
}

/// Value/label pair of the month dropdown
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct MonthOption {
    pub value: String,
    pub label: &'static str,
}

pub fn month_options() -> Vec<MonthOption> {
    MONTH_NAMES
        .iter()
        .enumerate()
        .map(|(i, label)| MonthOption {
            value: format!("{:02}", i + 1),
            label,
        })
        .collect()
}

/// Current year of an instant, used to seed [`year_options`]
pub fn year_of<Tz: TimeZone>(value: &DateTime<Tz>) -> i32 {
    value.year()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_service_timestamps() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 14, 18, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2025-03-14T18:30:00+00:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-14T18:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-14T18:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-14 18:30:00+00"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-14T20:30:00+02:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2025-03-14"),
            Some(Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("next tuesday"), None);
    }

    #[test]
    fn month_range_is_half_open() {
        assert_eq!(
            month_range(2025, 3),
            ("2025-03-01".to_string(), "2025-04-01".to_string())
        );
        assert_eq!(
            month_range(2025, 9),
            ("2025-09-01".to_string(), "2025-10-01".to_string())
        );
    }

    #[test]
    fn december_rolls_into_next_year() {
        assert_eq!(
            month_range(2025, 12),
            ("2025-12-01".to_string(), "2026-01-01".to_string())
        );
    }

    #[test]
    fn every_month_range_is_consistent() {
        for month in 1..=12u32 {
            let (start, end) = month_range(2024, month);
            let start = parse_timestamp(&start).unwrap();
            let end = parse_timestamp(&end).unwrap();
            assert!(start < end);
            assert_eq!(start.month(), month);
            assert_eq!(end.day(), 1);
        }
    }

    #[test]
    fn year_range_bounds() {
        assert_eq!(
            year_range(2025),
            ("2025-01-01".to_string(), "2026-01-01".to_string())
        );
    }

    #[test]
    fn validates_filter_values() {
        assert!(is_valid_year("2025"));
        assert!(!is_valid_year("25"));
        assert!(is_valid_month("01"));
        assert!(is_valid_month("12"));
        assert!(!is_valid_month("13"));
        assert!(!is_valid_month("1"));
        assert!(is_valid_iso_date("2024-02-29"));
        assert!(!is_valid_iso_date("2025-02-30"));
        assert!(!is_valid_iso_date("2025/02/01"));
    }

    #[test]
    fn formats_card_dates() {
        let evening = Utc.with_ymd_and_hms(2025, 3, 5, 18, 0, 0).unwrap();
        assert_eq!(format_date_time(&evening), "05 March 2025 • 6:00 PM");

        let midnight = Utc.with_ymd_and_hms(2024, 12, 31, 0, 15, 0).unwrap();
        assert_eq!(format_date_time(&midnight), "31 December 2024 • 12:15 AM");

        let noon = Utc.with_ymd_and_hms(2025, 7, 20, 12, 5, 0).unwrap();
        assert_eq!(format_date_time(&noon), "20 July 2025 • 12:05 PM");
    }

    #[test]
    fn formats_in_the_given_zone() {
        let utc = Utc.with_ymd_and_hms(2025, 3, 5, 20, 0, 0).unwrap();
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        assert_eq!(
            format_date_time(&utc.with_timezone(&ist)),
            "06 March 2025 • 1:30 AM"
        );
    }

    #[test]
    fn upcoming_includes_the_current_instant() {
        let now = Utc.with_ymd_and_hms(2025, 3, 5, 18, 0, 0).unwrap();
        assert!(is_upcoming(&now, &now));
        assert!(!is_upcoming(&(now - chrono::Duration::seconds(1)), &now));
        assert_eq!(day_string(&now), "2025-03-05");
    }

    #[test]
    fn dropdown_options() {
        assert_eq!(year_options(2025), vec![2025, 2024, 2023, 2022, 2021, 2020]);
        let months = month_options();
        assert_eq!(months.len(), 12);
        assert_eq!(months[0].value, "01");
        assert_eq!(months[11].label, "December");
    }
}
