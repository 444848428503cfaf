//! Calendar and clock handling
//!
//! Aging and clearance stamping work on the *local calendar date* of the
//! collection territory, never on raw UTC timestamps. This module provides
//! the timezone wrapper that derives that date and a clock abstraction so
//! that no operation reads ambient wall-clock time implicitly.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Timezone wrapper for collection territories
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
        Tz::from_str(&s)
            .map(Timezone)
            .map_err(|_| serde::de::Error::custom(format!("Invalid timezone: {}", s)))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Parses an IANA timezone name (e.g. "Asia/Kolkata")
    pub fn parse(name: &str) -> Option<Self> {
        Tz::from_str(name).ok().map(Timezone)
    }

    /// Returns the local calendar date of the given instant
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.0).date_naive()
    }

    /// Gets the start of day (00:00:00) in this timezone as UTC
    pub fn start_of_day(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        date.and_hms_opt(0, 0, 0)?
            .and_local_timezone(self.0)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Gets the start of the following day in this timezone as UTC
    ///
    /// Together with [`start_of_day`](Self::start_of_day) this bounds a
    /// half-open `[start, end)` window covering one local calendar day.
    pub fn start_of_next_day(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        self.start_of_day(date.succ_opt()?)
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::Asia::Kolkata)
    }
}

/// A source of the current instant
///
/// Reconciliation operations take "today" and "now" as parameters; callers
/// obtain them from a Clock so tests can pin time.
pub trait Clock: Send + Sync {
    /// Returns the current instant
    fn now(&self) -> DateTime<Utc>;

    /// Returns the local calendar date of the current instant
    fn today(&self, tz: &Timezone) -> NaiveDate {
        tz.local_date(self.now())
    }
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a fixed instant, for tests
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_local_date_crosses_midnight() {
        // 20:00 UTC is already the next day in Kolkata (UTC+5:30)
        let tz = Timezone::default();
        let instant = Utc.with_ymd_and_hms(2024, 3, 15, 20, 0, 0).unwrap();
        assert_eq!(
            tz.local_date(instant),
            NaiveDate::from_ymd_opt(2024, 3, 16).unwrap()
        );
    }

    #[test]
    fn test_day_window_is_half_open() {
        let tz = Timezone::default();
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        let start = tz.start_of_day(date).unwrap();
        let end = tz.start_of_next_day(date).unwrap();

        assert_eq!(end - start, chrono::Duration::days(1));
        assert_eq!(tz.local_date(start), date);
        assert_eq!(tz.local_date(end - chrono::Duration::seconds(1)), date);
    }

    #[test]
    fn test_fixed_clock_today() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let clock = FixedClock(instant);
        assert_eq!(
            clock.today(&Timezone::default()),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
    }

    #[test]
    fn test_timezone_parse() {
        assert!(Timezone::parse("Asia/Kolkata").is_some());
        assert!(Timezone::parse("Not/AZone").is_none());
    }
}
