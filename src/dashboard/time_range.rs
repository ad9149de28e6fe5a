// Time window for /api/nmt requests, quick ranges and local date-time field helpers.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default window length when the dashboard opens (matches the "1h" quick range).
pub const DEFAULT_RANGE_SECS: i64 = 3600;

/// `[start, end]` in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

impl TimeRange {
    /// The `secs` seconds ending at `now`.
    pub fn last(secs: i64, now: i64) -> Self {
        Self {
            start: now - secs,
            end: now,
        }
    }

    pub fn default_at(now: i64) -> Self {
        Self::last(DEFAULT_RANGE_SECS, now)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuickRange {
    TenMinutes,
    ThirtyMinutes,
    OneHour,
}

impl QuickRange {
    pub const ALL: [QuickRange; 3] = [
        QuickRange::TenMinutes,
        QuickRange::ThirtyMinutes,
        QuickRange::OneHour,
    ];

    pub fn secs(self) -> i64 {
        match self {
            QuickRange::TenMinutes => 600,
            QuickRange::ThirtyMinutes => 1800,
            QuickRange::OneHour => 3600,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QuickRange::TenMinutes => "10m",
            QuickRange::ThirtyMinutes => "30m",
            QuickRange::OneHour => "1h",
        }
    }

    pub fn range_at(self, now: i64) -> TimeRange {
        TimeRange::last(self.secs(), now)
    }
}

impl fmt::Display for QuickRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Last {}", self.label())
    }
}

impl FromStr for QuickRange {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.label() == s)
            .ok_or_else(|| TimeParseError::UnknownRange(s.to_string()))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("invalid local date-time {0:?}, expected YYYY-MM-DDTHH:MM")]
    Format(String),
    #[error("local date-time {0:?} does not exist in this timezone")]
    Nonexistent(String),
    #[error("unknown quick range {0:?}, expected one of 10m, 30m, 1h")]
    UnknownRange(String),
}

/// Formats `ts` as local `YYYY-MM-DDTHH:MM` (seconds dropped). Out-of-range timestamps give "".
pub fn to_datetime_local(ts: i64) -> String {
    match DateTime::from_timestamp(ts, 0) {
        Some(utc) => utc.with_timezone(&Local).format("%Y-%m-%dT%H:%M").to_string(),
        None => String::new(),
    }
}

/// Parses a local `YYYY-MM-DDTHH:MM[:SS]` value into epoch seconds.
/// An ambiguous local time (DST fold) resolves to the earlier instant.
pub fn from_datetime_local(value: &str) -> Result<i64, TimeParseError> {
    let value = value.trim();
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| TimeParseError::Format(value.to_string()))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp())
        .ok_or_else(|| TimeParseError::Nonexistent(value.to_string()))
}
