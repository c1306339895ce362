//! Reporting windows and timezone handling
//!
//! Listings and statistics are filtered by an inclusive `[start, end]` window
//! where either bound may be absent. Daily snapshots derive their window
//! from a calendar date in the configured reporting timezone.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid window: start {start} must not be after end {end}")]
    InvalidWindow { start: String, end: String },

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Local time {0} does not exist in the reporting timezone")]
    NonexistentLocalTime(String),
}

/// Timezone wrapper for the reporting jurisdiction
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl FromStr for Timezone {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tz::from_str(s)
            .map(Timezone)
            .map_err(|_| TemporalError::UnknownTimezone(s.to_string()))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Gets the start of day (00:00:00) in this timezone as UTC
    pub fn start_of_day(&self, date: NaiveDate) -> Result<DateTime<Utc>, TemporalError> {
        let local = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| TemporalError::NonexistentLocalTime(date.to_string()))?;
        self.resolve(local, true)
    }

    /// Gets the end of day (23:59:59.999999999) in this timezone as UTC
    pub fn end_of_day(&self, date: NaiveDate) -> Result<DateTime<Utc>, TemporalError> {
        let local = date
            .and_hms_nano_opt(23, 59, 59, 999_999_999)
            .ok_or_else(|| TemporalError::NonexistentLocalTime(date.to_string()))?;
        self.resolve(local, false)
    }

    /// Window covering one calendar day in this timezone
    pub fn day_window(&self, date: NaiveDate) -> Result<DateWindow, TemporalError> {
        DateWindow::between(self.start_of_day(date)?, self.end_of_day(date)?)
    }

    fn resolve(&self, local: NaiveDateTime, earliest: bool) -> Result<DateTime<Utc>, TemporalError> {
        match self.0.from_local_datetime(&local) {
            LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(first, second) => {
                let chosen = if earliest { first } else { second };
                Ok(chosen.with_timezone(&Utc))
            }
            LocalResult::None => Err(TemporalError::NonexistentLocalTime(local.to_string())),
        }
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::UTC)
    }
}

/// An inclusive time window; absent bounds are unbounded on that side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateWindow {
    /// A window with no bounds
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Creates a window from optional bounds, rejecting inverted ones
    pub fn new(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Self, TemporalError> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(TemporalError::InvalidWindow {
                    start: s.to_rfc3339(),
                    end: e.to_rfc3339(),
                });
            }
        }
        Ok(Self { start, end })
    }

    /// Creates a bounded window
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TemporalError> {
        Self::new(Some(start), Some(end))
    }

    /// Window from `start` onwards
    pub fn since(start: DateTime<Utc>) -> Self {
        Self { start: Some(start), end: None }
    }

    /// Window up to and including `end`
    pub fn until(end: DateTime<Utc>) -> Self {
        Self { start: None, end: Some(end) }
    }

    /// Returns true if the timestamp falls within both bounds (inclusive)
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| timestamp >= s) && self.end.map_or(true, |e| timestamp <= e)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_day_window_in_utc() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let window = Timezone::default().day_window(date).unwrap();
        assert_eq!(window.start, Some(Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap()));
        let end = window.end.unwrap();
        assert!(end > Utc.with_ymd_and_hms(2024, 3, 15, 23, 59, 59).unwrap());
        assert!(end < Utc.with_ymd_and_hms(2024, 3, 16, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_day_window_shifts_with_timezone() {
        let tz: Timezone = "Africa/Cairo".parse().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let start = tz.start_of_day(date).unwrap();
        // Cairo is UTC+2 in January
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 9, 22, 0, 0).unwrap());
    }

    #[test]
    fn test_inverted_window_rejected() {
        let now = Utc::now();
        let result = DateWindow::between(now, now - Duration::hours(1));
        assert!(matches!(result, Err(TemporalError::InvalidWindow { .. })));
    }

    #[test]
    fn test_unknown_timezone() {
        assert!("Mars/Olympus".parse::<Timezone>().is_err());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        let window = DateWindow::between(start, end).unwrap();
        assert!(window.contains(start));
        assert!(window.contains(end));
        assert!(!window.contains(end + Duration::seconds(1)));
    }
}
