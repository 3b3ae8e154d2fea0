//! UTC instants with millisecond precision.
//!
//! Managed creation/update fields and date-time field values both use
//! [`Timestamp`]. Equality is by instant: two timestamps built from different
//! offsets compare equal when they name the same moment.

use chrono::{DateTime, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// A point in time, normalized to UTC and truncated to milliseconds.
///
/// Truncation keeps values stable across a store round trip, so a reloaded
/// record does not look dirty because of lost sub-millisecond digits.
/// Deserialization truncates too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "DateTime<Utc>", into = "DateTime<Utc>")]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current wall-clock instant.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now().trunc_subsecs(3))
    }

    /// Creates a timestamp from milliseconds since the Unix epoch.
    pub fn from_millis(millis: i64) -> Result<Self> {
        DateTime::from_timestamp_millis(millis)
            .map(Self)
            .ok_or_else(|| Error::InvalidTimestamp(format!("{millis} ms is out of range")))
    }

    /// Creates a timestamp from a date-time in any offset.
    #[must_use]
    pub fn from_datetime<Tz: TimeZone>(dt: DateTime<Tz>) -> Self {
        Self(dt.with_timezone(&Utc).trunc_subsecs(3))
    }

    /// Parses an RFC 3339 string such as `2024-03-01T12:00:00+02:00`.
    pub fn parse(s: &str) -> Result<Self> {
        DateTime::parse_from_rfc3339(s.trim())
            .map(Self::from_datetime)
            .map_err(|e| Error::InvalidTimestamp(format!("{s:?}: {e}")))
    }

    /// Milliseconds since the Unix epoch.
    #[must_use]
    pub fn as_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Returns the underlying UTC date-time.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns a timestamp `millis` later (or earlier when negative).
    pub fn add_millis(&self, millis: i64) -> Result<Self> {
        Self::from_millis(self.as_millis().saturating_add(millis))
    }

    #[must_use]
    pub fn is_before(&self, other: &Self) -> bool {
        self < other
    }

    #[must_use]
    pub fn is_after(&self, other: &Self) -> bool {
        self > other
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Timestamp {
    fn from(dt: DateTime<Tz>) -> Self {
        Self::from_datetime(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
