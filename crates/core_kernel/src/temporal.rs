//! Reporting periods and business-day boundaries
//!
//! The reconciliation window is an inclusive `[start, end]` pair validated at
//! construction. Calendar-day summaries ("entries for today") depend on the
//! till's local timezone, wrapped here so day-boundary math lives in one
//! place.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    /// The requested window ends before it starts.
    #[error("invalid period: end {end} is before start {start}")]
    InvalidPeriod {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// An inclusive reporting window `[start, end]`
///
/// `start == end` is a legal (instantaneous) window; `end < start` is
/// rejected rather than silently swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl ReportPeriod {
    /// Creates a period, rejecting `end < start`.
    ///
    /// # Errors
    ///
    /// Returns [`TemporalError::InvalidPeriod`] with both bounds so callers
    /// can render a precise message without re-querying.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TemporalError> {
        if end < start {
            return Err(TemporalError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// True if `at` falls inside the window (both bounds inclusive).
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Timezone of the till, used for calendar-day boundaries
///
/// Wraps `chrono_tz::Tz` with serde support. Defaults to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Converts a UTC instant to the local timezone.
    pub fn to_local(&self, utc: DateTime<Utc>) -> DateTime<Tz> {
        utc.with_timezone(&self.0)
    }

    /// Start of the local calendar day (00:00:00) as a UTC instant.
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        self.resolve_local(date, Duration::zero())
    }

    /// End of the local calendar day (23:59:59.999999999) as a UTC instant.
    pub fn end_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        self.resolve_local(
            date,
            Duration::days(1) - Duration::nanoseconds(1),
        )
    }

    /// `[start_of_day, end_of_day]` for the local calendar day containing `at`.
    pub fn day_bounds(&self, at: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let local_date = self.to_local(at).date_naive();
        (self.start_of_day(local_date), self.end_of_day(local_date))
    }

    /// Resolves local midnight plus an offset, tolerating DST transitions.
    fn resolve_local(&self, date: NaiveDate, offset: Duration) -> DateTime<Utc> {
        let naive = date.and_time(chrono::NaiveTime::MIN) + offset;
        naive
            .and_local_timezone(self.0)
            .earliest()
            // Midnight can fall in a DST gap; the UTC reading is close enough
            // for a day boundary.
            .map_or_else(|| naive.and_utc(), |dt| dt.with_timezone(&Utc))
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::UTC)
    }
}

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
            .map_err(|_| serde::de::Error::custom(format!("invalid timezone: {}", s)))
    }
}
