//! Timezone-agnostic calendar date used for every availability comparison.
//!
//! A [`DateKey`] is built either from explicit local parts or from an
//! instant's own local calendar, and serialises only as `YYYY-MM-DD`.
//! Deserialisation accepts the canonical form only. Values coming back from
//! storage go through
//! [`DateKey::normalize_stored_value`], which cuts the date substring out of
//! the raw text instead of reparsing it in some timezone.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

static CANONICAL_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").expect("valid regex"));

const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateKeyError {
    #[error("invalid calendar date {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("malformed date value '{0}' (expected YYYY-MM-DD or an ISO timestamp)")]
    Malformed(String),
}

/// Calendar date without time of day or zone.
///
/// Ordering and equality match the lexicographic order of the canonical
/// string, because the canonical form is fixed width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type, utoipa::ToSchema)]
#[sqlx(transparent)]
#[schema(value_type = String, example = "2025-06-13")]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Build from local year / month (1-12) / day (1-31).
    pub fn from_local_parts(year: i32, month: u32, day: u32) -> Result<Self, DateKeyError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(DateKeyError::InvalidDate { year, month, day });
        }
        NaiveDate::from_ymd_opt(year, month, day)
            .map(DateKey)
            .ok_or(DateKeyError::InvalidDate { year, month, day })
    }

    /// Calendar date of `instant` as seen in its own timezone.
    ///
    /// `date_naive()` reads the local fields; no UTC round trip happens here.
    pub fn from_native_local_date<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        DateKey(instant.date_naive())
    }

    /// Zero-padded `YYYY-MM-DD`.
    pub fn to_canonical_string(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.0.year(), self.0.month(), self.0.day())
    }

    /// Strict parse of the canonical form only.
    pub fn parse_canonical(raw: &str) -> Result<Self, DateKeyError> {
        let caps = CANONICAL_DATE
            .captures(raw)
            .ok_or_else(|| DateKeyError::Malformed(raw.to_string()))?;
        // The pattern guarantees ASCII digits of bounded width.
        let year: i32 = caps[1].parse().map_err(|_| DateKeyError::Malformed(raw.to_string()))?;
        let month: u32 = caps[2].parse().map_err(|_| DateKeyError::Malformed(raw.to_string()))?;
        let day: u32 = caps[3].parse().map_err(|_| DateKeyError::Malformed(raw.to_string()))?;
        Self::from_local_parts(year, month, day)
    }

    /// Normalize a date value read back from storage.
    ///
    /// Canonical strings are used as is. Otherwise the text before the first
    /// `T` must be canonical: `2025-03-04T15:00:00.000Z` yields `2025-03-04`
    /// whatever the process timezone is. Anything else is rejected.
    pub fn normalize_stored_value(raw: &str) -> Result<Self, DateKeyError> {
        if CANONICAL_DATE.is_match(raw) {
            return Self::parse_canonical(raw);
        }
        match raw.split_once('T') {
            Some((date_part, _)) => Self::parse_canonical(date_part)
                .map_err(|_| DateKeyError::Malformed(raw.to_string())),
            None => Err(DateKeyError::Malformed(raw.to_string())),
        }
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Day of week with 0 = Sunday .. 6 = Saturday.
    pub fn weekday_from_sunday(&self) -> u8 {
        self.0.weekday().num_days_from_sunday() as u8
    }

    /// `self + days`, or `None` past the supported year range.
    pub fn add_days(&self, days: u32) -> Option<Self> {
        self.0
            .checked_add_days(Days::new(u64::from(days)))
            .filter(|d| d.year() <= MAX_YEAR)
            .map(DateKey)
    }

    /// Signed number of days from `earlier` to `self`.
    pub fn days_since(&self, earlier: DateKey) -> i64 {
        (self.0 - earlier.0).num_days()
    }

    pub fn as_naive_date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        DateKey(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

impl FromStr for DateKey {
    type Err = DateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_canonical(s)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_canonical_string())
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateKey::parse_canonical(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn key(y: i32, m: u32, d: u32) -> DateKey {
        DateKey::from_local_parts(y, m, d).unwrap()
    }

    #[test]
    fn test_canonical_string_is_zero_padded() {
        assert_eq!(key(2025, 3, 4).to_canonical_string(), "2025-03-04");
        assert_eq!(key(2025, 12, 31).to_canonical_string(), "2025-12-31");
        assert_eq!(key(987, 1, 9).to_canonical_string(), "0987-01-09");
    }

    #[test]
    fn test_from_local_parts_rejects_impossible_dates() {
        assert!(DateKey::from_local_parts(2025, 2, 29).is_err());
        assert!(DateKey::from_local_parts(2025, 13, 1).is_err());
        assert!(DateKey::from_local_parts(2025, 4, 31).is_err());
        assert!(DateKey::from_local_parts(0, 1, 1).is_err());
        assert!(DateKey::from_local_parts(10000, 1, 1).is_err());
        assert!(DateKey::from_local_parts(2024, 2, 29).is_ok());
    }

    #[test]
    fn test_normalize_canonical_value() {
        assert_eq!(DateKey::normalize_stored_value("2025-06-13").unwrap(), key(2025, 6, 13));
    }

    #[test]
    fn test_normalize_strips_time_suffix_without_shifting() {
        // A UTC-midnight timestamp stays on its own day.
        assert_eq!(
            DateKey::normalize_stored_value("2025-03-04T00:00:00.000Z").unwrap(),
            key(2025, 3, 4)
        );
        // Late evening with a negative offset is not moved to the next day.
        assert_eq!(
            DateKey::normalize_stored_value("2025-03-04T23:30:00-05:00").unwrap(),
            key(2025, 3, 4)
        );
        assert_eq!(
            DateKey::normalize_stored_value("2025-03-04T15:00:00+09:00").unwrap(),
            key(2025, 3, 4)
        );
    }

    #[test]
    fn test_normalize_rejects_unknown_formats() {
        assert!(DateKey::normalize_stored_value("2025/03/04").is_err());
        assert!(DateKey::normalize_stored_value("04-03-2025").is_err());
        assert!(DateKey::normalize_stored_value("2025-03-04 10:00:00").is_err());
        assert!(DateKey::normalize_stored_value("T10:00").is_err());
        assert!(DateKey::normalize_stored_value("").is_err());
        assert!(DateKey::normalize_stored_value("2025-3-4").is_err());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["2025-01-01", "1999-12-31", "2024-02-29"] {
            let once = DateKey::normalize_stored_value(raw).unwrap();
            let twice = DateKey::normalize_stored_value(&once.to_canonical_string()).unwrap();
            assert_eq!(once, twice);
            assert_eq!(once.to_canonical_string(), raw);
        }
    }

    #[test]
    fn test_native_local_date_ignores_offset() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let new_york = FixedOffset::west_opt(5 * 3600).unwrap();

        // 00:30 and 23:30 local wall clock on the same date in both zones.
        for (h, m) in [(0, 30), (23, 30), (12, 0)] {
            let t1 = tokyo.with_ymd_and_hms(2025, 3, 4, h, m, 0).unwrap();
            let t2 = new_york.with_ymd_and_hms(2025, 3, 4, h, m, 0).unwrap();
            assert_eq!(DateKey::from_native_local_date(&t1), key(2025, 3, 4));
            assert_eq!(DateKey::from_native_local_date(&t2), key(2025, 3, 4));
        }
    }

    #[test]
    fn test_ordering_matches_canonical_strings() {
        let dates = [key(2025, 1, 9), key(2025, 1, 10), key(2024, 12, 31), key(2025, 10, 1)];
        for a in &dates {
            for b in &dates {
                assert_eq!(a.cmp(b), a.to_canonical_string().cmp(&b.to_canonical_string()));
            }
        }
    }

    #[test]
    fn test_weekday_from_sunday() {
        assert_eq!(key(2025, 3, 2).weekday_from_sunday(), 0); // Sunday
        assert_eq!(key(2025, 3, 4).weekday_from_sunday(), 2); // Tuesday
        assert_eq!(key(2025, 3, 8).weekday_from_sunday(), 6); // Saturday
    }

    #[test]
    fn test_add_days_and_days_since() {
        let start = key(2025, 2, 27);
        assert_eq!(start.add_days(2), Some(key(2025, 3, 1)));
        assert_eq!(key(2025, 3, 1).days_since(start), 2);
        assert_eq!(start.days_since(key(2025, 3, 1)), -2);
        assert_eq!(key(9999, 12, 31).add_days(1), None);
    }

    #[test]
    fn test_serde_uses_canonical_form() {
        let json = serde_json::to_string(&key(2025, 6, 1)).unwrap();
        assert_eq!(json, "\"2025-06-01\"");
        let back: DateKey = serde_json::from_str("\"2025-06-01\"").unwrap();
        assert_eq!(back, key(2025, 6, 1));
        assert!(serde_json::from_str::<DateKey>("\"June 1\"").is_err());
    }

    #[test]
    fn test_deserialize_rejects_timestamps() {
        // 2025-06-14 00:00 in JST, as a browser's toISOString() sends it.
        assert!(serde_json::from_str::<DateKey>("\"2025-06-13T15:00:00.000Z\"").is_err());
        assert!(serde_json::from_str::<DateKey>("\"2025-06-01T00:00:00Z\"").is_err());
        assert!(serde_json::from_str::<DateKey>("\"2025-6-1\"").is_err());
    }

    #[test]
    fn test_from_str_is_strict() {
        assert_eq!("2025-06-01".parse::<DateKey>().unwrap(), key(2025, 6, 1));
        assert!("2025-06-01T00:00:00Z".parse::<DateKey>().is_err());
    }
}
