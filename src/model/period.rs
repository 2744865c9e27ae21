//! Calendar month references and the normalization of their raw encodings.
//!
//! A period arrives from the remote collection in one of several historical forms:
//! - free text `M/YYYY` or `MM/YYYY`
//! - a spreadsheet serial date such as `45808`
//! - an ISO day `YYYY-MM-DD` (or the month alone, `YYYY-MM`)
//!
//! All of them normalize to a `Month`, which renders as `MM/YYYY`. Anything else is kept verbatim
//! as `Period::Unparsed`.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Days between the spreadsheet epoch (1899-12-30) and 1970-01-01.
const SERIAL_EPOCH_OFFSET_DAYS: f64 = 25569.0;

/// The first serial affected by the spreadsheet engine treating 1900 as a leap year.
const SERIAL_LEAP_BUG_FIRST: f64 = 60.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// A calendar month. Ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Returns `None` unless `month` is in `1..=12` and `year` has at most four digits.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) && (0..=9999).contains(&year) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn from_date(date: impl Datelike) -> Option<Self> {
        Self::new(date.year(), date.month())
    }

    /// The month of the local calendar date.
    pub fn current() -> Self {
        let today = Local::now().date_naive();
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    /// Converts a spreadsheet serial date to its month.
    ///
    /// The serial is shifted by the 25569-day offset to the Unix epoch (fractions of a day are
    /// rounded to the nearest second). Serials of 60 and above get one more day added to the
    /// converted date to account for the phantom 1900-02-29; serials up to 59 are not corrected.
    pub fn from_serial(serial: f64) -> Option<Self> {
        if !serial.is_finite() {
            return None;
        }
        let seconds = ((serial - SERIAL_EPOCH_OFFSET_DAYS) * SECONDS_PER_DAY).round();
        let mut instant = DateTime::<Utc>::from_timestamp(seconds as i64, 0)?;
        if serial >= SERIAL_LEAP_BUG_FIRST {
            instant = instant.checked_add_signed(Duration::days(1))?;
        }
        Self::from_date(instant.date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The numeric sort key `year * 100 + month`.
    pub fn key(&self) -> i64 {
        i64::from(self.year) * 100 + i64::from(self.month)
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}/{:04}", self.month, self.year)
    }
}

/// The error returned when a month token cannot be understood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodError(String);

impl Display for PeriodError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "'{}' is not a month, expected MM/YYYY or YYYY-MM",
            self.0
        )
    }
}

impl Error for PeriodError {}

impl FromStr for Month {
    type Err = PeriodError;

    /// Accepts only `MM/YYYY`, `M/YYYY` and `YYYY-MM`. Serial numbers and ISO days are
    /// remote encodings and are left to `Period::normalize`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        parse_month_year(trimmed)
            .or_else(|| parse_year_month(trimmed))
            .ok_or_else(|| PeriodError(s.to_string()))
    }
}

/// The month a transaction is attributed to, or the raw token when it could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Period {
    Month(Month),
    Unparsed(String),
}

impl Period {
    /// Normalizes any of the supported raw encodings. This never fails: a token that is not
    /// understood is returned unchanged as `Period::Unparsed`.
    pub fn normalize(raw: &str) -> Period {
        let trimmed = raw.trim();
        let month = if trimmed.contains('/') {
            parse_month_year(trimmed)
        } else if let Some(month) = parse_iso(trimmed) {
            Some(month)
        } else if let Ok(serial) = trimmed.parse::<f64>() {
            Month::from_serial(serial)
        } else {
            None
        };
        match month {
            Some(month) => Period::Month(month),
            None => Period::Unparsed(raw.to_string()),
        }
    }

    pub fn month(&self) -> Option<Month> {
        match self {
            Period::Month(month) => Some(*month),
            Period::Unparsed(_) => None,
        }
    }

    /// `year * 100 + month`, or `None` for an unparsed token.
    pub fn sort_key(&self) -> Option<i64> {
        self.month().map(|m| m.key())
    }
}

impl From<Month> for Period {
    fn from(month: Month) -> Self {
        Period::Month(month)
    }
}

impl Default for Period {
    fn default() -> Self {
        Period::Unparsed(String::new())
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Month(month) => Display::fmt(month, f),
            Period::Unparsed(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for Period {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Period::normalize(&s))
    }
}

/// Parses an ISO day, `YYYY-MM-DD`.
pub(crate) fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    if s.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// `M/YYYY` or `MM/YYYY`.
fn parse_month_year(s: &str) -> Option<Month> {
    let (month, year) = s.split_once('/')?;
    if !is_digits(month, 1..=2) || !is_digits(year, 4..=4) {
        return None;
    }
    Month::new(year.parse().ok()?, month.parse().ok()?)
}

/// `YYYY-MM-DD` or `YYYY-MM`.
fn parse_iso(s: &str) -> Option<Month> {
    match parse_iso_date(s) {
        Some(date) => Month::from_date(date),
        None => parse_year_month(s),
    }
}

/// `YYYY-MM`.
fn parse_year_month(s: &str) -> Option<Month> {
    let (year, month) = s.split_once('-')?;
    if !is_digits(year, 4..=4) || !is_digits(month, 1..=2) {
        return None;
    }
    Month::new(year.parse().ok()?, month.parse().ok()?)
}

fn is_digits(s: &str, len: std::ops::RangeInclusive<usize>) -> bool {
    len.contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(year: i32, month: u32) -> Period {
        Period::Month(Month::new(year, month).unwrap())
    }

    #[test]
    fn test_normalize_pads_single_digit_month() {
        assert_eq!(Period::normalize("6/2025").to_string(), "06/2025");
    }

    #[test]
    fn test_normalize_keeps_two_digit_month() {
        assert_eq!(Period::normalize("11/2024"), month(2024, 11));
    }

    #[test]
    fn test_normalize_serial_applies_leap_correction() {
        // 45808 - 25569 = 20239 days after 1970-01-01 is 2025-05-31, plus the one-day
        // correction lands on 2025-06-01.
        assert_eq!(Period::normalize("45808").to_string(), "06/2025");
        assert_eq!(Period::normalize("45657").to_string(), "01/2025");
    }

    #[test]
    fn test_normalize_serial_below_threshold_is_not_corrected() {
        // 59 converts to 1900-02-27 as is. 60 converts to 1900-02-28 and the correction moves
        // it into March.
        assert_eq!(Month::from_serial(59.0), Month::new(1900, 2));
        assert_eq!(Month::from_serial(60.0), Month::new(1900, 3));
        assert_eq!(Month::from_serial(1.0), Month::new(1899, 12));
    }

    #[test]
    fn test_normalize_fractional_serial() {
        assert_eq!(Period::normalize("45808.75").to_string(), "06/2025");
    }

    #[test]
    fn test_normalize_iso_day_and_month() {
        assert_eq!(Period::normalize("2025-06-14"), month(2025, 6));
        assert_eq!(Period::normalize("2025-06"), month(2025, 6));
    }

    #[test]
    fn test_normalize_passes_through_garbage() {
        assert_eq!(
            Period::normalize("June"),
            Period::Unparsed("June".to_string())
        );
        assert_eq!(
            Period::normalize("13/2025"),
            Period::Unparsed("13/2025".to_string())
        );
        assert_eq!(Period::normalize(""), Period::Unparsed(String::new()));
        assert_eq!(
            Period::normalize("NaN"),
            Period::Unparsed("NaN".to_string())
        );
    }

    #[test]
    fn test_sort_key() {
        assert_eq!(month(2025, 6).sort_key(), Some(202506));
        assert_eq!(Period::normalize("x").sort_key(), None);
        assert!(Month::new(2024, 12).unwrap() < Month::new(2025, 1).unwrap());
    }

    #[test]
    fn test_month_from_str_is_strict() {
        assert_eq!(Month::from_str("7/2025").unwrap().to_string(), "07/2025");
        assert_eq!(Month::from_str("2025-07").unwrap().to_string(), "07/2025");
        let err = Month::from_str("July").unwrap_err();
        assert!(err.to_string().contains("'July' is not a month"));
    }

    #[test]
    fn test_month_from_str_rejects_remote_encodings() {
        assert!(Month::from_str("2025").is_err());
        assert!(Month::from_str("45808").is_err());
        assert!(Month::from_str("2025-06-14").is_err());
        assert_eq!(Period::normalize("45808").to_string(), "06/2025");
    }

    #[test]
    fn test_period_serde() {
        let p: Period = serde_json::from_str("\"3/2024\"").unwrap();
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"03/2024\"");
    }
}
