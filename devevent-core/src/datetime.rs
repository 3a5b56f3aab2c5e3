//! Date and time normalization
//!
//! Dates are stored as `YYYY-MM-DD`, times as zero-padded 24-hour `HH:MM`.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::validation::ValidationError;

/// ISO layouts with a numeric offset (`+HHMM` or `+HH:MM`), any precision.
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M%z",
];

/// Naive date-time layouts tried after the offset-carrying ones.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%B %d, %Y %I:%M %p",
    "%B %d, %Y %H:%M",
    "%B %d %Y %I:%M %p",
    "%B %d %Y %H:%M",
    "%d %B %Y %I:%M %p",
    "%d %B %Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M",
];

/// Plain calendar date layouts.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%A, %B %d, %Y",
];

const INVALID_DATE: ValidationError = ValidationError::InvalidFormat {
    field: "date",
    reason: "invalid date format; expected a calendar date such as YYYY-MM-DD",
};

const INVALID_TIME: ValidationError = ValidationError::InvalidFormat {
    field: "time",
    reason: "invalid time format; use HH:MM or HH:MM AM/PM",
};

const TIME_OUT_OF_RANGE: ValidationError = ValidationError::InvalidFormat {
    field: "time",
    reason: "invalid time values; hour must be 0-23 (1-12 with AM/PM) and minute 0-59",
};

/// `YYYY` or `YYYY-MM`; the missing parts default to the first.
static PARTIAL_ISO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})(?:-([0-9]{1,2}))?$").expect("invalid partial date regex"));

static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^([0-9]{1,2}):([0-9]{2})(?:\s*(AM|PM))?$").expect("invalid time regex")
});

/// Parse anything that reads as a calendar date or timestamp.
///
/// Timestamps carrying an offset are moved to UTC before the date is taken.
pub fn parse_calendar_date(input: &str) -> Option<NaiveDate> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Some(dt) = parse_with_offset(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Some(date) = parse_partial_iso(s) {
        return Some(date);
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        })
}

fn parse_with_offset(s: &str) -> Option<DateTime<FixedOffset>> {
    // A trailing `Z` is UTC; chrono's `%z` only reads numeric offsets.
    let owned;
    let s = match s.strip_suffix(['Z', 'z']) {
        Some(rest) => {
            owned = format!("{}+0000", rest);
            owned.as_str()
        }
        None => s,
    };

    OFFSET_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
}

fn parse_partial_iso(s: &str) -> Option<NaiveDate> {
    let caps = PARTIAL_ISO_RE.captures(s)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => 1,
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Normalize a date string to `YYYY-MM-DD`, dropping time of day.
///
/// # Example
/// ```
/// use devevent_core::datetime::normalize_date;
///
/// assert_eq!(normalize_date("2025-03-05").unwrap(), "2025-03-05");
/// assert_eq!(normalize_date("March 5, 2025").unwrap(), "2025-03-05");
/// assert!(normalize_date("next tuesday").is_err());
/// ```
pub fn normalize_date(input: &str) -> Result<String, ValidationError> {
    parse_calendar_date(input)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .ok_or(INVALID_DATE)
}

/// Normalize `H:MM`, `HH:MM` or either with an AM/PM suffix to 24-hour `HH:MM`.
///
/// # Example
/// ```
/// use devevent_core::datetime::normalize_time;
///
/// assert_eq!(normalize_time("2:30 PM").unwrap(), "14:30");
/// assert_eq!(normalize_time("12:00 AM").unwrap(), "00:00");
/// assert!(normalize_time("13:00 PM").is_err());
/// ```
pub fn normalize_time(input: &str) -> Result<String, ValidationError> {
    let caps = TIME_RE.captures(input.trim()).ok_or(INVALID_TIME)?;

    let hour: u32 = caps[1].parse().map_err(|_| INVALID_TIME)?;
    let minute: u32 = caps[2].parse().map_err(|_| INVALID_TIME)?;
    if minute > 59 {
        return Err(TIME_OUT_OF_RANGE);
    }

    let hour = match caps.get(3).map(|m| m.as_str().to_ascii_uppercase()) {
        Some(period) => {
            if !(1..=12).contains(&hour) {
                return Err(TIME_OUT_OF_RANGE);
            }
            match (period.as_str(), hour) {
                ("AM", 12) => 0,
                ("PM", 12) => 12,
                ("PM", h) => h + 12,
                (_, h) => h,
            }
        }
        None if hour > 23 => return Err(TIME_OUT_OF_RANGE),
        None => hour,
    };

    Ok(format!("{:02}:{:02}", hour, minute))
}
